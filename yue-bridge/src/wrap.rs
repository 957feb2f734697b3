//! Wrapped VM primitives
//!
//! One wrapper per primitive that can fail internally. Every wrapper arms a
//! boundary frame, runs the primitive under the transfer mark, disarms the
//! frame, and reports the outcome: the primitive's result on completion, the
//! operation's sentinel if the call trapped. Call [`crate::unwind_status`]
//! after any wrapper whose return value alone is ambiguous.
//!
//! Primitives the VM guarantees cannot fail internally are not wrapped;
//! they live directly on `Context`, `Table`, and `Runtime`.

use yue_core::ops::{coerce, compare, construct, control, index};
use yue_core::{protected, Context, ContextRef, NativeFn, Str, TypeTag, UserdataDtor};

pub use yue_core::ops::control::{BREAK, YIELD};
pub use yue_core::{BufferRef, UserdataRef};

// ==================== lifecycle ====================

/// Spawn a new execution context sharing `ctx`'s runtime. Pushes the thread
/// value and returns its handle; `None` if the spawn trapped.
pub fn new_thread(ctx: &Context) -> Option<ContextRef> {
    protected(ctx, None, || Some(control::spawn(ctx)))
}

/// Return `ctx` to a reusable idle state.
pub fn reset_thread(ctx: &Context) {
    protected(ctx, (), || control::reset(ctx))
}

// ==================== inspection / conversion ====================

/// Equality of the values at `idx1` and `idx2`. A failing user-supplied
/// `__eq` traps like any other failure; a trapped call reports `false`,
/// indistinguishable from a clean inequality except by status.
pub fn equal(ctx: &Context, idx1: i32, idx2: i32) -> bool {
    protected(ctx, false, || compare::equal(ctx, idx1, idx2))
}

/// Ordering of the values at `idx1` and `idx2`; incomparable operands trap.
pub fn less_than(ctx: &Context, idx1: i32, idx2: i32) -> bool {
    protected(ctx, false, || compare::less_than(ctx, idx1, idx2))
}

/// String view of the value at `idx`, converting numbers in place.
pub fn to_lstring(ctx: &Context, idx: i32) -> Option<Str> {
    protected(ctx, None, || coerce::to_lstring(ctx, idx))
}

/// Length of the value at `idx`.
pub fn obj_len(ctx: &Context, idx: i32) -> usize {
    protected(ctx, 0, || coerce::obj_len(ctx, idx))
}

// ==================== construction ====================

/// Push a byte string.
pub fn push_lstring(ctx: &Context, bytes: &[u8]) {
    protected(ctx, (), || construct::push_lstring(ctx, bytes))
}

/// Push a host callback closure capturing the top `nup` values, tagged
/// host-owned.
pub fn push_closure(ctx: &Context, func: NativeFn, debug_name: Option<&str>, nup: usize) {
    protected(ctx, (), || {
        construct::push_closure(ctx, func, debug_name, nup)
    })
}

/// Allocate a zeroed, tagged userdata block.
pub fn new_userdata_tagged(ctx: &Context, size: usize, tag: usize) -> Option<UserdataRef> {
    protected(ctx, None, || {
        Some(construct::new_userdata_tagged(ctx, size, tag))
    })
}

/// Allocate a tagged userdata block carrying the metatable registered for
/// `tag`.
pub fn new_userdata_tagged_with_metatable(
    ctx: &Context,
    size: usize,
    tag: usize,
) -> Option<UserdataRef> {
    protected(ctx, None, || {
        Some(construct::new_userdata_tagged_with_metatable(ctx, size, tag))
    })
}

/// Allocate a userdata block with a destructor.
pub fn new_userdata_dtor(ctx: &Context, size: usize, dtor: UserdataDtor) -> Option<UserdataRef> {
    protected(ctx, None, || {
        Some(construct::new_userdata_dtor(ctx, size, dtor))
    })
}

/// Allocate a zeroed byte buffer.
pub fn new_buffer(ctx: &Context, size: usize) -> Option<BufferRef> {
    protected(ctx, None, || Some(construct::new_buffer(ctx, size)))
}

// ==================== table access / mutation ====================

/// `t[k]` with `t` at `idx` and `k` on top; replaces the key with the
/// result and returns its type tag. A trapped read reports `TypeTag::Nil`.
pub fn get_table(ctx: &Context, idx: i32) -> TypeTag {
    protected(ctx, TypeTag::Nil, || index::get_table(ctx, idx))
}

/// `t.name` with `t` at `idx`; pushes the result and returns its type tag.
pub fn get_field(ctx: &Context, idx: i32, name: &str) -> TypeTag {
    protected(ctx, TypeTag::Nil, || index::get_field(ctx, idx, name))
}

/// Push a fresh table with array/hash size hints.
pub fn create_table(ctx: &Context, narr: usize, nrec: usize) {
    protected(ctx, (), || index::create_table(ctx, narr, nrec))
}

/// `t[k] = v` with `k` at -2 and `v` on top (both popped), honoring
/// `__newindex`.
pub fn set_table(ctx: &Context, idx: i32) {
    protected(ctx, (), || index::set_table(ctx, idx))
}

/// `t.name = v` with `v` on top (popped), honoring `__newindex`.
pub fn set_field(ctx: &Context, idx: i32, name: &str) {
    protected(ctx, (), || index::set_field(ctx, idx, name))
}

/// Metamethod-blind `t.name = v`.
pub fn raw_set_field(ctx: &Context, idx: i32, name: &str) {
    protected(ctx, (), || index::raw_set_field(ctx, idx, name))
}

/// Metamethod-blind `t[k] = v`.
pub fn raw_set(ctx: &Context, idx: i32) {
    protected(ctx, (), || index::raw_set(ctx, idx))
}

/// Metamethod-blind `t[n] = v`.
pub fn raw_set_i(ctx: &Context, idx: i32, n: i32) {
    protected(ctx, (), || index::raw_set_i(ctx, idx, n))
}

/// Install the table (or nil) on top as the metatable of the value at
/// `objindex`.
pub fn set_metatable(ctx: &Context, objindex: i32) -> bool {
    protected(ctx, false, || index::set_metatable(ctx, objindex))
}

/// Remove every entry from the table at `idx`.
pub fn clear_table(ctx: &Context, idx: i32) {
    protected(ctx, (), || index::clear_table(ctx, idx))
}

/// Push a shallow, writable copy of the table at `idx`.
pub fn clone_table(ctx: &Context, idx: i32) {
    protected(ctx, (), || index::clone_table(ctx, idx))
}

/// Push a copy of the closure at `idx`.
pub fn clone_function(ctx: &Context, idx: i32) {
    protected(ctx, (), || index::clone_function(ctx, idx))
}

// ==================== control transfer ====================

/// Suspend `ctx` back to its resumer with the top `nresults` values.
/// Returns [`YIELD`] on success; suspension is not a failure and leaves the
/// status clean. A trapped call (yielding from the root) reports `0`.
pub fn yield_ctx(ctx: &Context, nresults: i32) -> i32 {
    protected(ctx, 0, || control::yield_ctx(ctx, nresults))
}

/// Request a cooperative interrupt, honored at the next safe point.
/// Returns [`BREAK`]; a trapped call reports `0`.
pub fn break_ctx(ctx: &Context) -> i32 {
    protected(ctx, 0, || control::break_ctx(ctx))
}

// ==================== iteration ====================

/// Advance a traversal of the table at `idx`: pops the previous key and
/// pushes the next key/value pair. Returns false (pushing nothing) when the
/// traversal is done, or when the call trapped; check the status.
pub fn next(ctx: &Context, idx: i32) -> bool {
    protected(ctx, false, || index::next(ctx, idx))
}

// ==================== string assembly ====================

/// Concatenate the top `n` values into one string value. The coercion may
/// consult `__concat`, which can itself fail.
pub fn concat(ctx: &Context, n: usize) {
    protected(ctx, (), || coerce::concat(ctx, n))
}

// ==================== registration ====================

/// Name a light-userdata tag for diagnostics.
pub fn set_lightuserdata_name(ctx: &Context, tag: usize, name: &str) {
    protected(ctx, (), || {
        construct::set_lightuserdata_name(ctx, tag, name)
    })
}
