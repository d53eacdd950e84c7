//! Agent lifecycle state

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`DebugAgent`](crate::agent::DebugAgent)
///
/// `Stopped` is both the initial state and the terminal state after `stop`.
/// The state is mutated only by the thread that calls `start`/`stop`.
/// Invariant: `Running` holds iff the worker thread is alive and has
/// completed initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// No worker thread exists
    Stopped,

    /// The worker thread is alive and its child environment is initialized
    Running,
}

impl AgentState {
    /// Check if the agent is running
    pub fn is_running(&self) -> bool {
        matches!(self, AgentState::Running)
    }
}

impl Default for AgentState {
    fn default() -> Self {
        AgentState::Stopped
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentState::Stopped => write!(f, "Stopped"),
            AgentState::Running => write!(f, "Running"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_checks() {
        assert!(!AgentState::Stopped.is_running());
        assert!(AgentState::Running.is_running());
        assert_eq!(AgentState::default(), AgentState::Stopped);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(AgentState::Stopped.to_string(), "Stopped");
        assert_eq!(AgentState::Running.to_string(), "Running");
    }
}
