//! Value model
//!
//! A plain enum over reference-counted heap objects. The kernel is
//! single-threaded by contract (one active context per runtime), so `Rc` and
//! interior mutability are sufficient; none of these types are `Send`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::object::{Closure, Userdata};
use crate::state::Context;
use crate::table::Table;

pub type TableRef = Rc<RefCell<Table>>;
pub type UserdataRef = Rc<RefCell<Userdata>>;
pub type BufferRef = Rc<RefCell<Box<[u8]>>>;
pub type ContextRef = Rc<Context>;

/// An immutable byte string. Scripts may hold arbitrary bytes, not just UTF-8.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Str(Rc<[u8]>);

impl Str {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Str(Rc::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Str {
    fn from(s: &str) -> Self {
        Str::from_bytes(s.as_bytes())
    }
}

impl fmt::Display for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

/// VM type tags in the classic Lua order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeTag {
    Nil = 0,
    Boolean,
    LightUserdata,
    Number,
    String,
    Table,
    Function,
    Userdata,
    Thread,
    Buffer,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Nil => "nil",
            TypeTag::Boolean => "boolean",
            TypeTag::LightUserdata => "userdata",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Table => "table",
            TypeTag::Function => "function",
            TypeTag::Userdata => "userdata",
            TypeTag::Thread => "thread",
            TypeTag::Buffer => "buffer",
        }
    }
}

/// A single VM value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    LightUserdata { ptr: usize, tag: usize },
    Number(f64),
    String(Str),
    Table(TableRef),
    Function(Rc<Closure>),
    Userdata(UserdataRef),
    Thread(ContextRef),
    Buffer(BufferRef),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nil => TypeTag::Nil,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::LightUserdata { .. } => TypeTag::LightUserdata,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Table(_) => TypeTag::Table,
            Value::Function(_) => TypeTag::Function,
            Value::Userdata(_) => TypeTag::Userdata,
            Value::Thread(_) => TypeTag::Thread,
            Value::Buffer(_) => TypeTag::Buffer,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Lua truthiness: everything except nil and false.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Identity of a heap value, for identity-keyed table lookups.
    /// Returns `None` for value types.
    pub(crate) fn heap_id(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(Rc::as_ptr(&s.0) as *const u8 as usize),
            Value::Table(t) => Some(Rc::as_ptr(t) as usize),
            Value::Function(f) => Some(Rc::as_ptr(f) as usize),
            Value::Userdata(u) => Some(Rc::as_ptr(u) as usize),
            Value::Thread(c) => Some(Rc::as_ptr(c) as usize),
            Value::Buffer(b) => Some(Rc::as_ptr(b) as usize),
            _ => None,
        }
    }

    /// Raw (metamethod-blind) equality.
    pub fn raw_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::LightUserdata { ptr: a, .. }, Value::LightUserdata { ptr: b, .. }) => a == b,
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Userdata(a), Value::Userdata(b)) => Rc::ptr_eq(a, b),
            (Value::Thread(a), Value::Thread(b)) => Rc::ptr_eq(a, b),
            (Value::Buffer(a), Value::Buffer(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            other => write!(
                f,
                "{}: {:#x}",
                other.type_name(),
                other.heap_id().unwrap_or(0)
            ),
        }
    }
}
