//! Yue Bridge - failure-safe host surface over the VM kernel
//!
//! Every routine here wraps a kernel primitive that can fail internally.
//! The wrapper arms a per-call boundary frame before entering the kernel;
//! if the primitive fails, the transfer lands on that frame, the context
//! stack is restored to its depth at entry, and the wrapper returns the
//! operation's sentinel value instead of propagating. The outcome of the
//! most recent wrapped call is always queryable via [`unwind_status`], and
//! the failure itself via [`last_error`].
//!
//! The contract, from the host's side:
//! - a wrapper never unwinds through host frames for a script-level failure;
//! - sentinels are ordinary values (`false`, `None`, nil tag, `0`), so a
//!   caller that needs to distinguish "trapped" from "legitimately absent"
//!   must consult [`unwind_status`] immediately after the call;
//! - a new wrapped call overwrites the status, clean or failed.
//!
//! Host panics that are not VM failures pass through untouched: frames are
//! disarmed on the way out and the panic resumes past the boundary.

pub mod aux;
pub mod wrap;

// Re-export the kernel surface a host needs alongside the wrappers
pub use yue_config::{Subsystem, VmConfig};
pub use yue_core::{
    assert_mode, install_assert_abort, install_assert_log, AssertMode, BufferRef, Closure,
    CoStatus, Context, ContextRef, NativeFn, RuntimeError, Str, Table, TableRef, TypeTag,
    UnwindStatus, Userdata, UserdataDtor, UserdataRef, Value,
};
pub use wrap::{BREAK, YIELD};

/// Outcome of the most recent wrapped call on `ctx`'s runtime.
pub fn unwind_status(ctx: &Context) -> UnwindStatus {
    ctx.runtime().unwind_status()
}

/// The failure recorded by the most recent trapped call, if any. Clean
/// calls do not clear it; consult [`unwind_status`] first.
pub fn last_error(ctx: &Context) -> Option<RuntimeError> {
    ctx.runtime().last_error()
}
