//! Heap objects: native closures, tagged userdata

use std::cell::Cell;
use std::fmt;

use crate::state::Context;
use crate::value::{TableRef, Value};

/// A host callback. Arguments arrive on the context stack; the return value
/// is the number of results left on top.
pub type NativeFn = fn(&Context) -> i32;

/// Destructor run when a userdata block is collected.
pub type UserdataDtor = fn(&mut [u8]);

/// A native closure: a host function plus captured upvalues.
#[derive(Clone)]
pub struct Closure {
    pub func: NativeFn,
    pub debug_name: Option<String>,
    pub upvalues: Vec<Value>,
    /// Set when the closure was installed through the embedding boundary,
    /// so the binding glue can tell host callbacks from VM-internal ones.
    pub host_owned: Cell<bool>,
}

impl Closure {
    pub fn new(func: NativeFn, debug_name: Option<&str>, upvalues: Vec<Value>) -> Self {
        Closure {
            func,
            debug_name: debug_name.map(str::to_owned),
            upvalues,
            host_owned: Cell::new(false),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "function: {}",
            self.debug_name.as_deref().unwrap_or("<anonymous>")
        )
    }
}

/// A tagged block of host-owned bytes, optionally carrying a metatable and a
/// destructor.
pub struct Userdata {
    pub tag: usize,
    data: Box<[u8]>,
    metatable: Option<TableRef>,
    dtor: Option<UserdataDtor>,
}

impl Userdata {
    pub fn new(size: usize, tag: usize) -> Self {
        Userdata {
            tag,
            data: vec![0u8; size].into_boxed_slice(),
            metatable: None,
            dtor: None,
        }
    }

    pub fn with_metatable(size: usize, tag: usize, mt: TableRef) -> Self {
        let mut ud = Userdata::new(size, tag);
        ud.metatable = Some(mt);
        ud
    }

    pub fn with_dtor(size: usize, dtor: UserdataDtor) -> Self {
        let mut ud = Userdata::new(size, 0);
        ud.dtor = Some(dtor);
        ud
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn metatable(&self) -> Option<TableRef> {
        self.metatable.clone()
    }

    pub fn set_metatable(&mut self, mt: Option<TableRef>) {
        self.metatable = mt;
    }
}

impl Drop for Userdata {
    fn drop(&mut self) {
        if let Some(dtor) = self.dtor.take() {
            dtor(&mut self.data);
        }
    }
}
