//! Value construction: strings, closures, userdata, buffers

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::{Closure, NativeFn, Userdata, UserdataDtor};
use crate::state::Context;
use crate::transfer::raise;
use crate::value::{BufferRef, Str, UserdataRef, Value};

/// Push a byte string.
pub fn push_lstring(ctx: &Context, bytes: &[u8]) {
    ctx.push(Value::String(Str::from_bytes(bytes)));
}

/// Push a native closure capturing the top `nup` values as upvalues
/// (popped). The closure is tagged host-owned so the binding glue can tell
/// it apart from VM-internal callbacks.
pub fn push_closure(ctx: &Context, func: NativeFn, debug_name: Option<&str>, nup: usize) {
    let mut upvalues = Vec::with_capacity(nup);
    for _ in 0..nup {
        upvalues.push(ctx.pop());
    }
    upvalues.reverse();
    let closure = Closure::new(func, debug_name, upvalues);
    closure.host_owned.set(true);
    ctx.push(Value::Function(Rc::new(closure)));
}

fn check_tag(ctx: &Context, tag: usize) {
    if tag >= ctx.runtime().config().userdata_tag_limit {
        raise(RuntimeError::InvalidTag(tag));
    }
}

fn push_userdata(ctx: &Context, ud: Userdata) -> UserdataRef {
    let handle = Rc::new(RefCell::new(ud));
    ctx.push(Value::Userdata(handle.clone()));
    handle
}

/// Allocate a zeroed, tagged userdata block; pushes it and returns the
/// handle.
pub fn new_userdata_tagged(ctx: &Context, size: usize, tag: usize) -> UserdataRef {
    check_tag(ctx, tag);
    push_userdata(ctx, Userdata::new(size, tag))
}

/// Like [`new_userdata_tagged`], additionally wiring up the metatable
/// registered for `tag` on the runtime. A tag with no registered metatable
/// is a contract violation and raises.
pub fn new_userdata_tagged_with_metatable(ctx: &Context, size: usize, tag: usize) -> UserdataRef {
    check_tag(ctx, tag);
    let mt = match ctx.runtime().tag_metatable(tag) {
        Some(mt) => mt,
        None => raise(RuntimeError::MissingTagMetatable(tag)),
    };
    push_userdata(ctx, Userdata::with_metatable(size, tag, mt))
}

/// Allocate an untagged userdata block whose destructor runs when the value
/// is collected.
pub fn new_userdata_dtor(ctx: &Context, size: usize, dtor: UserdataDtor) -> UserdataRef {
    push_userdata(ctx, Userdata::with_dtor(size, dtor))
}

/// Allocate a zeroed byte buffer; pushes it and returns the handle.
/// Oversized requests raise rather than exhausting the host.
pub fn new_buffer(ctx: &Context, size: usize) -> BufferRef {
    if size > ctx.runtime().config().max_buffer_size {
        raise(RuntimeError::BufferTooBig(size));
    }
    let handle: BufferRef = Rc::new(RefCell::new(vec![0u8; size].into_boxed_slice()));
    ctx.push(Value::Buffer(handle.clone()));
    handle
}

/// Name a light-userdata tag for diagnostics. Tags beyond the configured
/// limit raise.
pub fn set_lightuserdata_name(ctx: &Context, tag: usize, name: &str) {
    if let Err(err) = ctx.runtime().set_light_name(tag, Str::from(name)) {
        raise(err);
    }
}
