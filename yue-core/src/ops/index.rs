//! Table access and mutation
//!
//! Metatable-aware reads and writes walk the `__index`/`__newindex` chain
//! with a bounded hop count; raw variants skip metatables entirely but still
//! report readonly violations and invalid keys by raising.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::metamethod::{lookup, Metamethod};
use crate::ops::call_native1;
use crate::state::Context;
use crate::table::Table;
use crate::transfer::raise;
use crate::value::{Str, TypeTag, Value};

/// Hop limit for `__index`/`__newindex` chains, matching the classic
/// interpreter bound.
const MAX_CHAIN: usize = 100;

fn index_get(ctx: &Context, mut target: Value, key: &Value) -> Value {
    for _ in 0..MAX_CHAIN {
        if let Value::Table(t) = &target {
            let raw = t.borrow().get(key);
            if !raw.is_nil() {
                return raw;
            }
            match lookup(&target, Metamethod::Index) {
                None => return Value::Nil,
                Some(Value::Function(f)) => {
                    return call_native1(ctx, &f, &[target.clone(), key.clone()])
                }
                Some(next) => target = next,
            }
        } else {
            match lookup(&target, Metamethod::Index) {
                None => raise(RuntimeError::NotIndexable(target.type_name())),
                Some(Value::Function(f)) => {
                    return call_native1(ctx, &f, &[target.clone(), key.clone()])
                }
                Some(next) => target = next,
            }
        }
    }
    raise(RuntimeError::IndexLoop)
}

fn index_set(ctx: &Context, mut target: Value, key: &Value, value: Value) {
    for _ in 0..MAX_CHAIN {
        if let Value::Table(t) = &target {
            let has_slot = !t.borrow().get(key).is_nil();
            if has_slot {
                if let Err(err) = t.borrow_mut().set(key.clone(), value) {
                    raise(err);
                }
                return;
            }
            match lookup(&target, Metamethod::NewIndex) {
                None => {
                    if let Err(err) = t.borrow_mut().set(key.clone(), value) {
                        raise(err);
                    }
                    return;
                }
                Some(Value::Function(f)) => {
                    call_native1(ctx, &f, &[target.clone(), key.clone(), value]);
                    return;
                }
                Some(next) => target = next,
            }
        } else {
            match lookup(&target, Metamethod::NewIndex) {
                None => raise(RuntimeError::NotIndexable(target.type_name())),
                Some(Value::Function(f)) => {
                    call_native1(ctx, &f, &[target.clone(), key.clone(), value]);
                    return;
                }
                Some(next) => target = next,
            }
        }
    }
    raise(RuntimeError::IndexLoop)
}

/// Read `t[k]` where `t` is at `idx` and `k` on top. The key is replaced by
/// the result; returns the result's type tag.
pub fn get_table(ctx: &Context, idx: i32) -> TypeTag {
    let target = ctx.value_at(idx);
    let key = ctx.value_at(-1);
    let result = index_get(ctx, target, &key);
    let tag = result.type_tag();
    ctx.pop();
    ctx.push(result);
    tag
}

/// Read `t.name` where `t` is at `idx`; pushes the result and returns its
/// type tag.
pub fn get_field(ctx: &Context, idx: i32, name: &str) -> TypeTag {
    let target = ctx.value_at(idx);
    let key = Value::String(Str::from(name));
    let result = index_get(ctx, target, &key);
    let tag = result.type_tag();
    ctx.push(result);
    tag
}

/// Write `t[k] = v` where `t` is at `idx`, `k` at -2 and `v` on top; pops
/// both.
pub fn set_table(ctx: &Context, idx: i32) {
    let target = ctx.value_at(idx);
    let key = ctx.value_at(-2);
    let value = ctx.value_at(-1);
    index_set(ctx, target, &key, value);
    ctx.pop_n(2);
}

/// Write `t.name = v` where `t` is at `idx` and `v` on top; pops it.
pub fn set_field(ctx: &Context, idx: i32, name: &str) {
    let target = ctx.value_at(idx);
    let key = Value::String(Str::from(name));
    let value = ctx.value_at(-1);
    index_set(ctx, target, &key, value);
    ctx.pop();
}

fn table_at(ctx: &Context, idx: i32) -> Rc<RefCell<Table>> {
    match ctx.value_at(idx) {
        Value::Table(t) => t,
        other => raise(RuntimeError::ExpectedTable(other.type_name())),
    }
}

fn raw_write(t: &Rc<RefCell<Table>>, key: Value, value: Value) {
    if let Err(err) = t.borrow_mut().set(key, value) {
        raise(err);
    }
}

/// Metamethod-blind `t[k] = v`; key at -2, value on top, both popped.
pub fn raw_set(ctx: &Context, idx: i32) {
    let t = table_at(ctx, idx);
    let key = ctx.value_at(-2);
    let value = ctx.value_at(-1);
    raw_write(&t, key, value);
    ctx.pop_n(2);
}

/// Metamethod-blind `t[n] = v`; value on top, popped.
pub fn raw_set_i(ctx: &Context, idx: i32, n: i32) {
    let t = table_at(ctx, idx);
    let value = ctx.value_at(-1);
    raw_write(&t, Value::Number(n as f64), value);
    ctx.pop();
}

/// Metamethod-blind `t.name = v`; value on top, popped.
pub fn raw_set_field(ctx: &Context, idx: i32, name: &str) {
    let t = table_at(ctx, idx);
    let value = ctx.value_at(-1);
    raw_write(&t, Value::String(Str::from(name)), value);
    ctx.pop();
}

/// Push a fresh table with array/hash size hints.
pub fn create_table(ctx: &Context, narr: usize, nrec: usize) {
    ctx.push(Value::Table(Rc::new(RefCell::new(Table::with_capacity(
        narr, nrec,
    )))));
}

/// Install the table (or nil) on top as the metatable of the value at
/// `objindex`; pops it. Readonly tables cannot have their metatable swapped.
pub fn set_metatable(ctx: &Context, objindex: i32) -> bool {
    let mt = match ctx.value_at(-1) {
        Value::Nil => None,
        Value::Table(t) => Some(t),
        other => raise(RuntimeError::ExpectedTable(other.type_name())),
    };
    match ctx.value_at(objindex) {
        Value::Table(t) => {
            if t.borrow().readonly() {
                raise(RuntimeError::ReadonlyTable);
            }
            t.borrow_mut().set_metatable(mt);
        }
        Value::Userdata(u) => u.borrow_mut().set_metatable(mt),
        other => raise(RuntimeError::BadMetatableTarget(other.type_name())),
    }
    ctx.pop();
    true
}

/// Remove every entry from the table at `idx`.
pub fn clear_table(ctx: &Context, idx: i32) {
    let t = table_at(ctx, idx);
    let cleared = t.borrow_mut().clear();
    if let Err(err) = cleared {
        raise(err);
    }
}

/// Push a shallow, writable copy of the table at `idx`.
pub fn clone_table(ctx: &Context, idx: i32) {
    let t = table_at(ctx, idx);
    let copy = t.borrow().duplicate();
    ctx.push(Value::Table(Rc::new(RefCell::new(copy))));
}

/// Push a copy of the closure at `idx`.
pub fn clone_function(ctx: &Context, idx: i32) {
    match ctx.value_at(idx) {
        Value::Function(f) => ctx.push(Value::Function(Rc::new((*f).clone()))),
        _ => raise(RuntimeError::NotFunction),
    }
}

/// Advance a traversal of the table at `idx`. Pops the previous key; pushes
/// the next key/value pair and returns true, or pushes nothing and returns
/// false when the traversal is done.
pub fn next(ctx: &Context, idx: i32) -> bool {
    let t = table_at(ctx, idx);
    let key = ctx.value_at(-1);
    let prev = if key.is_nil() { None } else { Some(&key) };
    let step = t.borrow().next(prev);
    match step {
        Ok(Some((k, v))) => {
            ctx.pop();
            ctx.push(k);
            ctx.push(v);
            true
        }
        Ok(None) => {
            ctx.pop();
            false
        }
        Err(err) => raise(err),
    }
}
