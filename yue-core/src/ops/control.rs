//! Context lifecycle and cooperative control transfer

use crate::assert::vm_assert;
use crate::error::RuntimeError;
use crate::object::Closure;
use crate::state::{Context, CoStatus};
use crate::transfer;
use crate::value::{ContextRef, Value};

use std::rc::Rc;

/// Code returned by a successful suspension.
pub const YIELD: i32 = -1;
/// Code returned by a successful interrupt request.
pub const BREAK: i32 = -1;

/// Spawn a new context sharing `ctx`'s runtime. The new thread value is
/// pushed onto `ctx`'s stack and its handle returned.
pub fn spawn(ctx: &Context) -> ContextRef {
    let child = ctx.spawn();
    ctx.push(Value::Thread(child.clone()));
    child
}

/// Return a context to its reusable idle shape.
pub fn reset(ctx: &Context) {
    ctx.reset();
}

/// Suspend `ctx` back to its resumer, keeping the top `nresults` values as
/// the yield values. The root context has no resumer to suspend to.
pub fn yield_ctx(ctx: &Context, nresults: i32) -> i32 {
    if ctx.is_root() {
        transfer::raise(RuntimeError::YieldFromRoot);
    }
    let keep = nresults.max(0) as usize;
    let keep = keep.min(ctx.top());
    ctx.keep_top(keep);
    ctx.set_status(CoStatus::Suspended);
    YIELD
}

/// Request a cooperative interrupt: the context unwinds at its next safe
/// point and can be resumed later. Distinct from suspension and from
/// failure; the request itself always succeeds.
pub fn break_ctx(ctx: &Context) -> i32 {
    ctx.request_interrupt();
    BREAK
}

/// Invoke a native closure with `args`, returning its first result.
///
/// Arguments are pushed, the callback runs, and the stack is restored to
/// its pre-call height. A transfer raised inside the callback propagates to
/// the innermost armed frame as usual.
pub(crate) fn call_native1(ctx: &Context, closure: &Rc<Closure>, args: &[Value]) -> Value {
    let base = ctx.top();
    for arg in args {
        ctx.push(arg.clone());
    }
    let nresults = (closure.func)(ctx);
    vm_assert!(nresults >= 0, "call_native1");
    let nresults = nresults.max(0) as usize;
    vm_assert!(ctx.top() >= base + nresults, "call_native1");

    let result = if nresults > 0 {
        ctx.value_at(-(nresults as i32))
    } else {
        Value::Nil
    };
    ctx.truncate(base);
    result
}
