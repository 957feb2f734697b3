//! String coercion, lengths, and concatenation

use crate::error::RuntimeError;
use crate::metamethod::{lookup, Metamethod};
use crate::ops::call_native1;
use crate::state::Context;
use crate::transfer::raise;
use crate::value::{Str, Value};

/// Render a number the way scripts see it: integral values without a
/// fractional part, everything else in shortest round-trip form.
pub fn fmt_number(n: f64) -> String {
    if n.is_nan() {
        "nan".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "inf" } else { "-inf" }.to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// String view of the value at `idx`. Numbers are converted in place, as
/// the classic API does; other types yield nothing (see
/// [`crate::ops::aux::to_lstring_meta`] for the `__tostring`-aware form).
pub fn to_lstring(ctx: &Context, idx: i32) -> Option<Str> {
    let slot = ctx.abs_index(idx)?;
    match ctx.value_at(idx) {
        Value::String(s) => Some(s),
        Value::Number(n) => {
            let s = Str::from(fmt_number(n).as_str());
            ctx.replace_slot(slot, Value::String(s.clone()));
            Some(s)
        }
        _ => None,
    }
}

/// Length of the value at `idx`: byte length for strings and buffers, the
/// sequence border for tables, the block size for userdata, zero otherwise.
pub fn obj_len(ctx: &Context, idx: i32) -> usize {
    match ctx.value_at(idx) {
        Value::String(s) => s.len(),
        Value::Table(t) => t.borrow().length(),
        Value::Buffer(b) => b.borrow().len(),
        Value::Userdata(u) => u.borrow().len(),
        _ => 0,
    }
}

fn concat_bytes(v: &Value) -> Option<Vec<u8>> {
    match v {
        Value::String(s) => Some(s.as_bytes().to_vec()),
        Value::Number(n) => Some(fmt_number(*n).into_bytes()),
        _ => None,
    }
}

fn concat_pair(ctx: &Context, a: Value, b: Value) -> Value {
    if let (Some(mut left), Some(right)) = (concat_bytes(&a), concat_bytes(&b)) {
        left.extend_from_slice(&right);
        return Value::String(Str::from_bytes(&left));
    }
    let handler = lookup(&a, Metamethod::Concat).or_else(|| lookup(&b, Metamethod::Concat));
    match handler {
        Some(Value::Function(f)) => call_native1(ctx, &f, &[a, b]),
        _ => {
            let offender = if concat_bytes(&a).is_none() { &a } else { &b };
            raise(RuntimeError::NotConcatenable(offender.type_name()))
        }
    }
}

/// Concatenate the top `n` values into one, right-associatively, coercing
/// numbers and consulting `__concat`. The operands are popped and the
/// result pushed; `n == 0` pushes the empty string.
pub fn concat(ctx: &Context, n: usize) {
    if n == 0 {
        ctx.push(Value::String(Str::from("")));
        return;
    }
    if n == 1 {
        return;
    }
    let mut acc = ctx.value_at(-1);
    for i in 2..=n {
        let lhs = ctx.value_at(-(i as i32));
        acc = concat_pair(ctx, lhs, acc);
    }
    ctx.pop_n(n);
    ctx.push(acc);
}
