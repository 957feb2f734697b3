//! Test helpers
//!
//! Shared setup for the boundary integration tests: a fresh root context
//! per test and small accessors over the value stack.

use yue_bridge::{Context, ContextRef, Value, VmConfig};

/// A fresh root execution context with default configuration. Also makes
/// sure a tracing subscriber is installed so `RUST_LOG=debug` shows the
/// trapped-failure lines during test runs.
pub fn root() -> ContextRef {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Context::new(VmConfig::default())
}

/// The string at `idx`, decoded lossily.
#[allow(dead_code)]
pub fn str_at(ctx: &Context, idx: i32) -> String {
    match ctx.value_at(idx) {
        Value::String(s) => String::from_utf8_lossy(s.as_bytes()).into_owned(),
        other => panic!("expected string at {idx}, got {}", other.type_name()),
    }
}

/// The number at `idx`.
#[allow(dead_code)]
pub fn num_at(ctx: &Context, idx: i32) -> f64 {
    match ctx.value_at(idx) {
        Value::Number(n) => n,
        other => panic!("expected number at {idx}, got {}", other.type_name()),
    }
}
