//! Script-level failure payloads
//!
//! Every failure the VM can signal through the fast transfer carries one of
//! these values. Messages follow the Lua convention so host-side diagnostics
//! read the same as they would from a stock interpreter.

use thiserror::Error;

/// A recoverable script-level failure.
///
/// Raised through [`crate::transfer::raise`] and captured by the nearest
/// armed boundary frame. Never crosses the wrapper surface as a panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("attempt to index a {0} value")]
    NotIndexable(&'static str),

    #[error("'__index' chain too long; possible loop")]
    IndexLoop,

    #[error("attempt to compare {0} with {1}")]
    NotComparable(&'static str, &'static str),

    #[error("attempt to concatenate a {0} value")]
    NotConcatenable(&'static str),

    #[error("attempt to modify a readonly table")]
    ReadonlyTable,

    #[error("table expected, got {0}")]
    ExpectedTable(&'static str),

    #[error("table index is nil")]
    NilKey,

    #[error("table index is NaN")]
    NanKey,

    #[error("invalid key to 'next'")]
    InvalidIterKey,

    #[error("attempt to yield from outside a coroutine")]
    YieldFromRoot,

    #[error("buffer allocation of {0} bytes exceeds the configured limit")]
    BufferTooBig(usize),

    #[error("invalid userdata tag {0}")]
    InvalidTag(usize),

    #[error("no metatable registered for userdata tag {0}")]
    MissingTagMetatable(usize),

    #[error("attempt to clone a non-function value")]
    NotFunction,

    #[error("attempt to set a metatable on a {0} value")]
    BadMetatableTarget(&'static str),

    #[error("'__tostring' must return a string")]
    BadToString,

    #[error("invalid argument #{narg} ({msg})")]
    ArgError { narg: i32, msg: String },
}

impl RuntimeError {
    /// Build the standard "T expected, got U" argument failure.
    pub fn type_mismatch(narg: i32, expected: &str, got: &str) -> Self {
        RuntimeError::ArgError {
            narg,
            msg: format!("{expected} expected, got {got}"),
        }
    }
}
