//! Opaque handles to isolated JavaScript execution environments
//!
//! The bridge never inspects an environment's contents. It only passes the
//! handle to the injected command and dispatch handlers, which close over the
//! actual engine objects. Each environment is accessed from exactly one
//! thread for its lifetime: the parent environment from the owner thread, the
//! child environment from the worker thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for environment identifiers
static NEXT_ENV_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to an isolated JavaScript execution environment
///
/// Cloning the handle does not clone the environment; all clones identify
/// the same context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    id: u64,
    label: String,
}

impl ExecutionEnvironment {
    /// Create a handle for a new environment
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: NEXT_ENV_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
        }
    }

    /// Unique identifier of the underlying context
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable label ("main", "debug-child", ...)
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Display for ExecutionEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.label, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids() {
        let a = ExecutionEnvironment::new("main");
        let b = ExecutionEnvironment::new("debug-child");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clone_identifies_same_environment() {
        let env = ExecutionEnvironment::new("main");
        let clone = env.clone();
        assert_eq!(env, clone);
        assert_eq!(env.id(), clone.id());
    }

    #[test]
    fn test_display() {
        let env = ExecutionEnvironment::new("main");
        assert_eq!(env.to_string(), format!("main#{}", env.id()));
    }
}
