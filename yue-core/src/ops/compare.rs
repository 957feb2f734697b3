//! Value comparison
//!
//! Structural equality and ordering. Both can hand control to user-supplied
//! comparison handlers, so both can fail mid-comparison; the caller wraps.

use crate::error::RuntimeError;
use crate::metamethod::{lookup, Metamethod};
use crate::ops::call_native1;
use crate::state::Context;
use crate::transfer::raise;
use crate::value::{TypeTag, Value};

fn eq_handler(a: &Value, b: &Value) -> Option<Value> {
    lookup(a, Metamethod::Eq).or_else(|| lookup(b, Metamethod::Eq))
}

/// Equality of the values at `idx1` and `idx2`, honoring `__eq` between
/// values of the same (table or userdata) type.
pub fn equal(ctx: &Context, idx1: i32, idx2: i32) -> bool {
    let a = ctx.value_at(idx1);
    let b = ctx.value_at(idx2);
    if a.raw_eq(&b) {
        return true;
    }
    let comparable = a.type_tag() == b.type_tag()
        && matches!(a.type_tag(), TypeTag::Table | TypeTag::Userdata);
    if !comparable {
        return false;
    }
    match eq_handler(&a, &b) {
        Some(Value::Function(f)) => call_native1(ctx, &f, &[a, b]).is_truthy(),
        _ => false,
    }
}

/// Ordering of the values at `idx1` and `idx2`: numbers by value, strings
/// bytewise, anything else through `__lt`. Incomparable operands raise.
pub fn less_than(ctx: &Context, idx1: i32, idx2: i32) -> bool {
    let a = ctx.value_at(idx1);
    let b = ctx.value_at(idx2);
    match (&a, &b) {
        (Value::Number(x), Value::Number(y)) => x < y,
        (Value::String(x), Value::String(y)) => x.as_bytes() < y.as_bytes(),
        _ => {
            let handler = lookup(&a, Metamethod::Lt).or_else(|| lookup(&b, Metamethod::Lt));
            match handler {
                Some(Value::Function(f)) => call_native1(ctx, &f, &[a, b]).is_truthy(),
                _ => raise(RuntimeError::NotComparable(a.type_name(), b.type_name())),
            }
        }
    }
}
