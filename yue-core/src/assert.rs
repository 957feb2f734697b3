//! Runtime assertion hooks
//!
//! VM-internal invariant violations are defects, not script conditions, so
//! they never travel through the failure boundary. They route here instead,
//! under one of two process-wide policies:
//!
//! - **log-and-continue**: write the diagnostic and keep going. State may be
//!   corrupt afterwards; chosen when availability beats safety.
//! - **log-and-terminate**: write the diagnostic and abort the process, so
//!   the host's crash reporting captures a native stack pointing at the real
//!   failure site instead of a later secondary failure.
//!
//! The mode is expected to be selected once at startup and left alone.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssertMode {
    LogContinue,
    LogTerminate,
}

static MODE: AtomicU8 = AtomicU8::new(0);

/// Select log-and-continue for internal invariant violations.
pub fn install_assert_log() {
    MODE.store(0, Ordering::SeqCst);
}

/// Select log-and-terminate for internal invariant violations.
pub fn install_assert_abort() {
    MODE.store(1, Ordering::SeqCst);
}

pub fn assert_mode() -> AssertMode {
    match MODE.load(Ordering::SeqCst) {
        0 => AssertMode::LogContinue,
        _ => AssertMode::LogTerminate,
    }
}

/// Report a violated VM invariant under the installed policy.
///
/// Under `LogTerminate` this call does not return.
#[doc(hidden)]
pub fn assert_failed(expression: &str, file: &str, line: u32, function: &str) {
    eprintln!("YUE ASSERT FAILED: {expression}");
    eprintln!("  at {file}:{line} in {function}");
    error!(
        target: "yue::vm",
        expression,
        file,
        line,
        function,
        "vm invariant violated"
    );
    if assert_mode() == AssertMode::LogTerminate {
        std::process::abort();
    }
}

/// Check a VM invariant, routing violations through the assertion hook.
macro_rules! vm_assert {
    ($cond:expr, $function:expr) => {
        if !$cond {
            $crate::assert::assert_failed(stringify!($cond), file!(), line!(), $function);
        }
    };
}

pub(crate) use vm_assert;
