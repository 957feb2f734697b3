//! Boundary frames
//!
//! Every wrapped call arms exactly one frame on its runtime's error-capture
//! stack for the duration of the call. A frame moves through
//! `Armed -> {Completed | Trapped}` and is popped on exit, which also writes
//! the runtime's unwind-status register. Enter and exit run on every path
//! out of a wrapped call, including captured transfers and host panics.

use std::panic;

use tracing::debug;

use crate::assert::vm_assert;
use crate::state::{Context, Runtime};
use crate::transfer::{self, Marked};

/// Outcome register of a runtime: the result of the most recently completed
/// wrapped call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnwindStatus {
    Clean,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameState {
    Armed,
    Completed,
    Trapped,
}

#[derive(Debug)]
pub struct BoundaryFrame {
    pub(crate) state: FrameState,
    /// Stack height of the calling context at entry; restored if the call
    /// traps so a failed call leaves no partial stack mutation behind.
    pub(crate) saved_top: usize,
}

fn enter(rt: &Runtime, saved_top: usize) {
    rt.capture.borrow_mut().push(BoundaryFrame {
        state: FrameState::Armed,
        saved_top,
    });
}

fn exit(rt: &Runtime) {
    let frame = rt.capture.borrow_mut().pop();
    vm_assert!(frame.is_some(), "boundary exit");
    if let Some(frame) = frame {
        vm_assert!(frame.state != FrameState::Armed, "boundary exit");
        rt.unwind.set(match frame.state {
            FrameState::Trapped => UnwindStatus::Failed,
            _ => UnwindStatus::Clean,
        });
    }
}

fn settle(rt: &Runtime, state: FrameState) -> usize {
    let mut capture = rt.capture.borrow_mut();
    vm_assert!(!capture.is_empty(), "boundary settle");
    match capture.last_mut() {
        Some(frame) => {
            frame.state = state;
            frame.saved_top
        }
        None => 0,
    }
}

/// Run one failure-capable primitive under an armed boundary frame.
///
/// Returns the primitive's result if it ran to completion, or `sentinel` if
/// a transfer was captured. The frame is entered and exited on every path;
/// a trapped call restores the context stack to its entry height and leaves
/// the runtime's unwind status reading `Failed`. Host panics that are not
/// transfers are rethrown after the frame is unwound.
pub fn protected<T>(ctx: &Context, sentinel: T, f: impl FnOnce() -> T) -> T {
    let rt = ctx.runtime();
    enter(rt, ctx.top());
    let result = match transfer::mark(f) {
        Marked::FellThrough(v) => {
            settle(rt, FrameState::Completed);
            Some(v)
        }
        Marked::Resumed(err) => {
            let saved_top = settle(rt, FrameState::Trapped);
            let top = ctx.top();
            vm_assert!(top >= saved_top, "boundary restore");
            if top > saved_top {
                ctx.truncate(saved_top);
            }
            debug!(target: "yue::vm", error = %err, "trapped script failure");
            rt.set_last_error(err);
            None
        }
        Marked::Foreign(payload) => {
            // host panic, not ours: disarm, restore the register, rethrow
            settle(rt, FrameState::Trapped);
            exit(rt);
            panic::resume_unwind(payload);
        }
    };
    exit(rt);
    result.unwrap_or(sentinel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use crate::state::Context;
    use crate::value::ContextRef;
    use yue_config::VmConfig;

    fn ctx() -> ContextRef {
        Context::new(VmConfig::default())
    }

    #[test]
    fn test_clean_call_balances_and_reads_clean() {
        let c = ctx();
        assert_eq!(c.runtime().capture_depth(), 0);
        let v = protected(&c, 0, || 41 + 1);
        assert_eq!(v, 42);
        assert_eq!(c.runtime().capture_depth(), 0);
        assert_eq!(c.runtime().unwind_status(), UnwindStatus::Clean);
    }

    #[test]
    fn test_trapped_call_returns_sentinel_and_reads_failed() {
        let c = ctx();
        let v = protected(&c, -1, || -> i32 {
            transfer::raise(RuntimeError::NotIndexable("boolean"))
        });
        assert_eq!(v, -1);
        assert_eq!(c.runtime().capture_depth(), 0);
        assert_eq!(c.runtime().unwind_status(), UnwindStatus::Failed);
        assert_eq!(
            c.runtime().last_error(),
            Some(RuntimeError::NotIndexable("boolean"))
        );
    }

    #[test]
    fn test_trap_restores_stack_height() {
        let c = ctx();
        c.push_number(1.0);
        protected(&c, (), || {
            c.push_number(2.0);
            c.push_number(3.0);
            transfer::raise(RuntimeError::NilKey)
        });
        assert_eq!(c.top(), 1);
    }

    #[test]
    fn test_status_reflects_last_call_only() {
        let c = ctx();
        protected(&c, (), || transfer::raise(RuntimeError::NilKey));
        assert_eq!(c.runtime().unwind_status(), UnwindStatus::Failed);
        protected(&c, (), || {});
        assert_eq!(c.runtime().unwind_status(), UnwindStatus::Clean);
    }

    #[test]
    fn test_nested_inner_trap_leaves_outer_clean() {
        let c = ctx();
        let outer = protected(&c, 0, || {
            let inner = protected(&c, -1, || -> i32 {
                transfer::raise(RuntimeError::NanKey)
            });
            assert_eq!(inner, -1);
            assert_eq!(c.runtime().capture_depth(), 1);
            7
        });
        assert_eq!(outer, 7);
        assert_eq!(c.runtime().capture_depth(), 0);
        assert_eq!(c.runtime().unwind_status(), UnwindStatus::Clean);
    }

    #[test]
    fn test_foreign_panic_unwinds_frames_then_rethrows() {
        let c = ctx();
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            protected(&c, (), || panic!("host bug"));
        }));
        assert!(caught.is_err());
        assert_eq!(c.runtime().capture_depth(), 0);
    }
}
