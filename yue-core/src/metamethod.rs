//! Metamethod lookup

use crate::value::{TableRef, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metamethod {
    Index,
    NewIndex,
    Eq,
    Lt,
    Concat,
    ToString,
}

impl Metamethod {
    pub fn name(self) -> &'static str {
        match self {
            Metamethod::Index => "__index",
            Metamethod::NewIndex => "__newindex",
            Metamethod::Eq => "__eq",
            Metamethod::Lt => "__lt",
            Metamethod::Concat => "__concat",
            Metamethod::ToString => "__tostring",
        }
    }
}

/// The metatable of a value, if its type carries one.
pub fn metatable_of(v: &Value) -> Option<TableRef> {
    match v {
        Value::Table(t) => t.borrow().metatable(),
        Value::Userdata(u) => u.borrow().metatable(),
        _ => None,
    }
}

/// Raw lookup of a metamethod handler on a value's metatable.
pub fn lookup(v: &Value, mm: Metamethod) -> Option<Value> {
    let mt = metatable_of(v)?;
    let handler = mt.borrow().get_field(mm.name());
    if handler.is_nil() {
        None
    } else {
        Some(handler)
    }
}
