//! Yue Core - VM kernel and failure-capture machinery (pure logic, no IO)
//!
//! Contains the value model, tables, execution contexts, the fast nonlocal
//! transfer the VM fails through, and the boundary-frame protocol that
//! converts those failures into ordinary return values. Only operates on
//! in-memory data structures.
//!
//! The operations under [`ops`] may raise and must be reached through the
//! wrapper catalog in `yue-bridge`, which arms a boundary frame around every
//! call. Configuration is passed explicitly via parameters, not via global
//! state; the single process-wide setting is the assertion-hook policy.

pub mod assert;
pub mod error;
pub mod frame;
pub mod metamethod;
pub mod object;
pub mod ops;
pub mod state;
pub mod table;
pub mod value;

pub(crate) mod transfer;

// Re-export common types
pub use error::RuntimeError;
pub use frame::{protected, UnwindStatus};
pub use object::{Closure, NativeFn, Userdata, UserdataDtor};
pub use state::{Context, CoStatus, Runtime};
pub use table::{Table, TableKey};
pub use value::{BufferRef, ContextRef, Str, TableRef, TypeTag, UserdataRef, Value};

// Re-export config types from yue-config
pub use yue_config::{Subsystem, VmConfig};

// Re-export the assertion-hook installers
pub use assert::{assert_mode, install_assert_abort, install_assert_log, AssertMode};
