//! Wrapped auxiliary helpers
//!
//! Convenience routines layered on the primitives: registry-backed type
//! metatables, metamethod-aware stringification, dotted-path table lookup,
//! and argument checking for host callbacks. Same boundary contract as
//! [`crate::wrap`]: each call arms a frame and reports a sentinel on trap.

use yue_core::ops::aux;
use yue_core::{protected, Context, Str, UserdataRef};

/// Create (or fetch) the metatable registered under `tname` and push it.
/// Returns true only when the metatable was newly created.
pub fn new_metatable(ctx: &Context, tname: &str) -> bool {
    protected(ctx, false, || aux::new_metatable(ctx, tname))
}

/// Stringify the value at `idx`, consulting `__tostring`; pushes the result.
pub fn to_lstring_meta(ctx: &Context, idx: i32) -> Option<Str> {
    protected(ctx, None, || Some(aux::to_lstring_meta(ctx, idx)))
}

/// Walk (creating as needed) the dotted path `fname` under the table at
/// `idx` and push the final table. Returns `None` on success, or the path
/// component occupied by a non-table value. A trapped call also reports
/// `None`; check the status.
pub fn find_table(ctx: &Context, idx: i32, fname: &str, szhint: usize) -> Option<String> {
    protected(ctx, None, || aux::find_table(ctx, idx, fname, szhint))
}

/// Type name of the value at `idx`, `"no value"` past the top. Armed like
/// every other entry, so the status register reflects this call afterwards.
pub fn type_name(ctx: &Context, idx: i32) -> &'static str {
    protected(ctx, "no value", || aux::type_name_at(ctx, idx))
}

/// Fail the current call with a type mismatch for argument `narg`.
/// Always traps; returns only to its resume point.
pub fn type_error(ctx: &Context, narg: i32, tname: &str) {
    protected(ctx, (), || aux::type_error(ctx, narg, tname))
}

/// Fail the current call with a message about argument `narg`. Always traps.
pub fn arg_error(ctx: &Context, narg: i32, msg: &str) {
    protected(ctx, (), || aux::arg_error(ctx, narg, msg))
}

/// Require argument `narg` to be a boolean and return it.
pub fn check_boolean(ctx: &Context, narg: i32) -> bool {
    protected(ctx, false, || aux::check_boolean(ctx, narg))
}

/// Require argument `ud` to be a userdata whose metatable is the one
/// registered under `tname`, and return it.
pub fn check_udata(ctx: &Context, ud: i32, tname: &str) -> Option<UserdataRef> {
    protected(ctx, None, || Some(aux::check_udata(ctx, ud, tname)))
}
