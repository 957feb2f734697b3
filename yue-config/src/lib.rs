//! Yue Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Yue crates.

/// Configuration for a VM runtime instance
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Initial value-stack capacity of each execution context
    pub initial_stack_capacity: usize,
    /// Number of usable tagged-userdata categories
    pub userdata_tag_limit: usize,
    /// Number of usable light-userdata tags
    pub light_userdata_tag_limit: usize,
    /// Largest byte buffer a script may allocate
    pub max_buffer_size: usize,
}

/// Subsystem enum for log-target selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subsystem {
    Vm,
    Bridge,
}

impl Subsystem {
    /// Get the string name of the subsystem
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Vm => "vm",
            Subsystem::Bridge => "bridge",
        }
    }

    /// Get the log target name for this subsystem
    pub fn target(&self) -> String {
        format!("yue::{}", self.as_str())
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            initial_stack_capacity: 256,
            userdata_tag_limit: 128,
            light_userdata_tag_limit: 128,
            max_buffer_size: 1 << 30,
        }
    }
}
