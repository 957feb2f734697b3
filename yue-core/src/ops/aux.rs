//! Registration utilities
//!
//! The registry-level conveniences: named metatables, dotted-path table
//! lookup, and argument checking. Argument/type failures are raised through
//! the same transfer as script failures; raising is these operations'
//! purpose, and they route through the boundary like everything else.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::metamethod::{lookup, Metamethod};
use crate::ops::call_native1;
use crate::ops::coerce;
use crate::state::Context;
use crate::table::Table;
use crate::transfer::raise;
use crate::value::{Str, UserdataRef, Value};

/// Fetch or create the named metatable `registry[tname]`; pushes it and
/// returns true when it was freshly created.
pub fn new_metatable(ctx: &Context, tname: &str) -> bool {
    let registry = ctx.runtime().registry();
    let existing = registry.borrow().get_field(tname);
    match existing {
        Value::Table(mt) => {
            ctx.push(Value::Table(mt));
            false
        }
        _ => {
            let mt = Rc::new(RefCell::new(Table::new()));
            if let Err(err) = registry
                .borrow_mut()
                .set_field(tname, Value::Table(mt.clone()))
            {
                raise(err);
            }
            ctx.push(Value::Table(mt));
            true
        }
    }
}

/// `__tostring`-aware string conversion of the value at `idx`; pushes the
/// resulting string and returns it. A `__tostring` handler that produces a
/// non-string raises. Values with no string form render as `type: 0xADDR`.
pub fn to_lstring_meta(ctx: &Context, idx: i32) -> Str {
    let v = ctx.value_at(idx);
    if let Some(Value::Function(f)) = lookup(&v, Metamethod::ToString) {
        match call_native1(ctx, &f, &[v]) {
            Value::String(s) => {
                ctx.push(Value::String(s.clone()));
                return s;
            }
            _ => raise(RuntimeError::BadToString),
        }
    }
    let rendered = match &v {
        Value::Nil => "nil".to_owned(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => coerce::fmt_number(*n),
        Value::String(s) => {
            ctx.push(Value::String(s.clone()));
            return s.clone();
        }
        other => format!("{}: {:#x}", other.type_name(), other.heap_id().unwrap_or(0)),
    };
    let s = Str::from(rendered.as_str());
    ctx.push(Value::String(s.clone()));
    s
}

/// Walk (and create) the dotted path `fname` under the table at `idx`.
/// Pushes the final table and returns `None` on success; returns the first
/// component that exists as a non-table otherwise.
pub fn find_table(ctx: &Context, idx: i32, fname: &str, szhint: usize) -> Option<String> {
    let mut current = match ctx.value_at(idx) {
        Value::Table(t) => t,
        other => raise(RuntimeError::ExpectedTable(other.type_name())),
    };
    for component in fname.split('.') {
        let existing = current.borrow().get_field(component);
        current = match existing {
            Value::Table(t) => t,
            Value::Nil => {
                let fresh = Rc::new(RefCell::new(Table::with_capacity(0, szhint)));
                if let Err(err) = current
                    .borrow_mut()
                    .set_field(component, Value::Table(fresh.clone()))
                {
                    raise(err);
                }
                fresh
            }
            _ => return Some(component.to_owned()),
        };
    }
    ctx.push(Value::Table(current));
    None
}

/// Type name of the value at `idx`; "no value" when the index addresses
/// nothing.
pub fn type_name_at(ctx: &Context, idx: i32) -> &'static str {
    match ctx.value_at_opt(idx) {
        Some(v) => v.type_name(),
        None => "no value",
    }
}

/// Raise the standard argument-type failure for argument `narg`.
pub fn type_error(ctx: &Context, narg: i32, tname: &str) -> ! {
    let got = type_name_at(ctx, narg);
    raise(RuntimeError::type_mismatch(narg, tname, got))
}

/// Raise a generic argument failure for argument `narg`.
pub fn arg_error(_ctx: &Context, narg: i32, msg: &str) -> ! {
    raise(RuntimeError::ArgError {
        narg,
        msg: msg.to_owned(),
    })
}

/// The boolean at argument `narg`, or the standard type failure.
pub fn check_boolean(ctx: &Context, narg: i32) -> bool {
    match ctx.value_at_opt(narg) {
        Some(Value::Boolean(b)) => b,
        _ => type_error(ctx, narg, "boolean"),
    }
}

/// The userdata at argument `ud`, provided its metatable is the named one
/// registered as `registry[tname]`; anything else is the standard type
/// failure.
pub fn check_udata(ctx: &Context, ud: i32, tname: &str) -> UserdataRef {
    if let Some(Value::Userdata(handle)) = ctx.value_at_opt(ud) {
        let expected = ctx.runtime().registry().borrow().get_field(tname);
        if let (Some(mt), Value::Table(want)) = (handle.borrow().metatable(), expected) {
            if Rc::ptr_eq(&mt, &want) {
                return handle.clone();
            }
        }
    }
    type_error(ctx, ud, tname)
}
