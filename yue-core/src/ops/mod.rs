//! Failure-capable primitives
//!
//! Every operation in this module may raise through the fast transfer and
//! must therefore only be reached from under an armed boundary frame, in
//! practice through the wrapper catalog in `yue-bridge`. Operations that
//! cannot fail internally live directly on `Context`/`Table`/`Runtime` as
//! plain pass-throughs instead.

pub mod aux;
pub mod coerce;
pub mod compare;
pub mod construct;
pub mod control;
pub mod index;

pub(crate) use control::call_native1;
