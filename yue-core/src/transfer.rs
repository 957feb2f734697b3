//! Fast nonlocal transfer
//!
//! The VM signals a recoverable failure by jumping straight back to the
//! innermost resume point, never by threading `Result`s through every
//! primitive. The jump rides the platform unwinder: [`raise`] panics with a
//! private payload and [`mark`] is the resume point that catches exactly
//! that payload. Host panics (genuine bugs) pass through untouched.
//!
//! A process-wide panic hook, installed once, stays silent for transfer
//! payloads instead of formatting a message and capturing a backtrace per
//! trapped failure. Observable semantics are identical with or without the
//! hook; only the per-trap cost differs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::OnceCell;

use crate::error::RuntimeError;

#[cfg(panic = "abort")]
compile_error!("yue-core requires panic=unwind: the failure boundary has no resume point under panic=abort");

/// The transfer payload. Private to the kernel; the boundary converts it
/// into a status flag before the host ever sees control again.
pub(crate) struct Transfer(pub RuntimeError);

static QUIET_HOOK: OnceCell<()> = OnceCell::new();

fn ensure_quiet_hook() {
    QUIET_HOOK.get_or_init(|| {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if info.payload().downcast_ref::<Transfer>().is_none() {
                prev(info);
            }
        }));
    });
}

/// Jump to the innermost [`mark`] on the current call chain.
///
/// If no mark is armed, this is an ordinary panic escaping into the host;
/// only the wrapper catalog is sanctioned to call failure-capable
/// primitives, and every wrapper arms a mark first.
pub(crate) fn raise(err: RuntimeError) -> ! {
    ensure_quiet_hook();
    panic::panic_any(Transfer(err))
}

/// Outcome of running a closure under a resume point.
pub(crate) enum Marked<T> {
    /// The closure ran to completion.
    FellThrough(T),
    /// A transfer fired inside the closure and resumed here.
    Resumed(RuntimeError),
    /// A non-transfer panic crossed the mark. The caller must restore its
    /// own bookkeeping and rethrow with `resume_unwind`.
    Foreign(Box<dyn Any + Send>),
}

/// Establish a resume point and run `f` under it.
pub(crate) fn mark<T>(f: impl FnOnce() -> T) -> Marked<T> {
    ensure_quiet_hook();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => Marked::FellThrough(v),
        Err(payload) => match payload.downcast::<Transfer>() {
            Ok(transfer) => Marked::Resumed(transfer.0),
            Err(other) => Marked::Foreign(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fell_through() {
        match mark(|| 7) {
            Marked::FellThrough(v) => assert_eq!(v, 7),
            _ => panic!("expected fall-through"),
        }
    }

    #[test]
    fn test_resumed_carries_the_error() {
        match mark(|| -> i32 { raise(RuntimeError::NilKey) }) {
            Marked::Resumed(err) => assert_eq!(err, RuntimeError::NilKey),
            _ => panic!("expected resumed"),
        }
    }

    #[test]
    fn test_foreign_panic_is_not_captured() {
        match mark(|| -> i32 { panic!("host bug") }) {
            Marked::Foreign(payload) => {
                assert_eq!(payload.downcast_ref::<&str>(), Some(&"host bug"));
            }
            _ => panic!("expected foreign"),
        }
    }

    #[test]
    fn test_nested_marks_resume_innermost() {
        let outer = mark(|| {
            let inner = mark(|| -> i32 { raise(RuntimeError::NanKey) });
            match inner {
                Marked::Resumed(err) => err,
                _ => panic!("inner mark should have resumed"),
            }
        });
        match outer {
            Marked::FellThrough(err) => assert_eq!(err, RuntimeError::NanKey),
            _ => panic!("outer mark should fall through"),
        }
    }
}
