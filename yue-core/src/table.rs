//! Tables
//!
//! Array part plus insertion-ordered hash part. The hash part uses an
//! `IndexMap` so that `next`-style traversal has a stable, deterministic
//! order even as the host interleaves reads.
//!
//! Raw reads are tolerant (nil/NaN keys simply miss); raw writes report the
//! conditions the VM raises on: readonly tables, nil keys, NaN keys.

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::value::{Str, TableRef, Value};

/// Hashable projection of a table key.
///
/// Heap-typed keys (`Obj`) compare and hash by identity and keep the value
/// alive so traversal can hand the original key back.
#[derive(Clone, Debug)]
pub enum TableKey {
    Boolean(bool),
    /// Canonical f64 bits: NaN rejected upstream, -0.0 normalized to 0.0.
    Number(u64),
    Str(Str),
    Obj(Value),
    Light { ptr: usize, tag: usize },
}

impl TableKey {
    /// Project a value into a key. Nil and NaN are not valid table keys.
    pub fn from_value(v: &Value) -> Result<TableKey, RuntimeError> {
        match v {
            Value::Nil => Err(RuntimeError::NilKey),
            Value::Boolean(b) => Ok(TableKey::Boolean(*b)),
            Value::Number(n) if n.is_nan() => Err(RuntimeError::NanKey),
            Value::Number(n) => {
                let canonical = if *n == 0.0 { 0.0 } else { *n };
                Ok(TableKey::Number(canonical.to_bits()))
            }
            Value::String(s) => Ok(TableKey::Str(s.clone())),
            Value::LightUserdata { ptr, tag } => Ok(TableKey::Light {
                ptr: *ptr,
                tag: *tag,
            }),
            other => Ok(TableKey::Obj(other.clone())),
        }
    }

    /// Recover the key as a value, for traversal.
    pub fn to_value(&self) -> Value {
        match self {
            TableKey::Boolean(b) => Value::Boolean(*b),
            TableKey::Number(bits) => Value::Number(f64::from_bits(*bits)),
            TableKey::Str(s) => Value::String(s.clone()),
            TableKey::Obj(v) => v.clone(),
            TableKey::Light { ptr, tag } => Value::LightUserdata {
                ptr: *ptr,
                tag: *tag,
            },
        }
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TableKey::Boolean(a), TableKey::Boolean(b)) => a == b,
            (TableKey::Number(a), TableKey::Number(b)) => a == b,
            (TableKey::Str(a), TableKey::Str(b)) => a == b,
            (TableKey::Obj(a), TableKey::Obj(b)) => a.heap_id() == b.heap_id(),
            // light userdata identity is the pointer alone
            (TableKey::Light { ptr: a, .. }, TableKey::Light { ptr: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for TableKey {}

impl std::hash::Hash for TableKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            TableKey::Boolean(b) => {
                state.write_u8(0);
                b.hash(state);
            }
            TableKey::Number(bits) => {
                state.write_u8(1);
                bits.hash(state);
            }
            TableKey::Str(s) => {
                state.write_u8(2);
                s.hash(state);
            }
            TableKey::Obj(v) => {
                state.write_u8(3);
                v.heap_id().hash(state);
            }
            TableKey::Light { ptr, .. } => {
                state.write_u8(4);
                ptr.hash(state);
            }
        }
    }
}

pub struct Table {
    array: Vec<Value>,
    hash: IndexMap<TableKey, Value>,
    metatable: Option<TableRef>,
    readonly: bool,
}

impl Table {
    pub fn new() -> Self {
        Table::with_capacity(0, 0)
    }

    /// Create a table with array/hash size hints.
    pub fn with_capacity(narr: usize, nrec: usize) -> Self {
        Table {
            array: Vec::with_capacity(narr),
            hash: IndexMap::with_capacity(nrec),
            metatable: None,
            readonly: false,
        }
    }

    pub fn metatable(&self) -> Option<TableRef> {
        self.metatable.clone()
    }

    pub fn set_metatable(&mut self, mt: Option<TableRef>) {
        self.metatable = mt;
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Index of `key` in the array part, if it addresses one.
    fn array_slot(&self, key: &Value) -> Option<usize> {
        let n = key.as_number()?;
        if n.fract() == 0.0 && n >= 1.0 && n <= self.array.len() as f64 {
            Some(n as usize - 1)
        } else {
            None
        }
    }

    /// Raw read. Tolerant of any key; absent keys read as nil.
    pub fn get(&self, key: &Value) -> Value {
        if let Some(slot) = self.array_slot(key) {
            return self.array[slot].clone();
        }
        match TableKey::from_value(key) {
            Ok(k) => self.hash.get(&k).cloned().unwrap_or(Value::Nil),
            Err(_) => Value::Nil,
        }
    }

    pub fn get_field(&self, name: &str) -> Value {
        self.hash
            .get(&TableKey::Str(Str::from(name)))
            .cloned()
            .unwrap_or(Value::Nil)
    }

    /// Raw write. Reports readonly violations and invalid keys.
    pub fn set(&mut self, key: Value, value: Value) -> Result<(), RuntimeError> {
        if self.readonly {
            return Err(RuntimeError::ReadonlyTable);
        }
        if let Some(slot) = self.array_slot(&key) {
            self.array[slot] = value;
            return Ok(());
        }
        // append extends the array part
        if let Some(n) = key.as_number() {
            if n.fract() == 0.0 && n == self.array.len() as f64 + 1.0 && !value.is_nil() {
                self.array.push(value);
                self.migrate_hash_tail();
                return Ok(());
            }
        }
        let k = TableKey::from_value(&key)?;
        if value.is_nil() {
            // shift_remove keeps traversal order for the surviving entries
            self.hash.shift_remove(&k);
        } else {
            self.hash.insert(k, value);
        }
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.set(Value::String(Str::from(name)), value)
    }

    /// Pull integer keys that became array-adjacent out of the hash part.
    ///
    /// An integer key written while the array part was short lands in the
    /// hash part; once an append grows the array up to it, the entry must
    /// become array-resident or the same key would exist in both parts and
    /// traversal could never pass it.
    fn migrate_hash_tail(&mut self) {
        loop {
            let next_key = TableKey::Number(((self.array.len() + 1) as f64).to_bits());
            match self.hash.shift_remove(&next_key) {
                Some(v) => self.array.push(v),
                None => break,
            }
        }
    }

    /// Sequence length: the array-part border.
    pub fn length(&self) -> usize {
        self.array.iter().take_while(|v| !v.is_nil()).count()
    }

    /// Advance a traversal. `key` of `None` starts from the beginning.
    ///
    /// Walks the array part first (skipping holes), then the hash part in
    /// insertion order. A key that is neither nil nor present is a traversal
    /// contract violation.
    pub fn next(&self, key: Option<&Value>) -> Result<Option<(Value, Value)>, RuntimeError> {
        let start = match key {
            None => 0,
            Some(k) => {
                if let Some(slot) = self.array_slot(k) {
                    slot + 1
                } else {
                    let tk = TableKey::from_value(k).map_err(|_| RuntimeError::InvalidIterKey)?;
                    let idx = self
                        .hash
                        .get_index_of(&tk)
                        .ok_or(RuntimeError::InvalidIterKey)?;
                    return Ok(self
                        .hash
                        .get_index(idx + 1)
                        .map(|(k, v)| (k.to_value(), v.clone())));
                }
            }
        };
        for (i, v) in self.array.iter().enumerate().skip(start) {
            if !v.is_nil() {
                return Ok(Some((Value::Number((i + 1) as f64), v.clone())));
            }
        }
        Ok(self
            .hash
            .get_index(0)
            .map(|(k, v)| (k.to_value(), v.clone())))
    }

    pub fn clear(&mut self) -> Result<(), RuntimeError> {
        if self.readonly {
            return Err(RuntimeError::ReadonlyTable);
        }
        self.array.clear();
        self.hash.clear();
        Ok(())
    }

    /// Shallow copy sharing the metatable. The copy is always writable.
    pub fn duplicate(&self) -> Table {
        Table {
            array: self.array.clone(),
            hash: self.hash.clone(),
            metatable: self.metatable.clone(),
            readonly: false,
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Table::new()
    }
}
