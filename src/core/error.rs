//! Bridge error types

use thiserror::Error;

/// Errors that can occur in the debugger bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The agent is already in the `Running` state
    #[error("Debug agent already running")]
    AlreadyRunning,

    /// A required capability was not injected before `start`
    #[error("Debug agent is not configured: {0} missing")]
    NotConfigured(&'static str),

    /// The OS refused to create the worker thread
    #[error("Failed to spawn debug worker thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The worker thread failed while constructing its child environment
    #[error("Debug worker failed to initialize: {0}")]
    WorkerInit(String),

    /// The worker did not signal readiness within the start timeout
    #[error("Timed out waiting for the debug worker to become ready")]
    StartTimeout,

    /// Timed out waiting for a debugger client to connect
    #[error("Timed out waiting for a debugger connection")]
    ConnectTimeout,

    /// A bridge entry point was invoked on a binding with no attached agent.
    ///
    /// This indicates a defect in the binding layer, not a user error. It is
    /// not recoverable at the call site.
    #[error("Bridge call on a binding with no associated debug agent")]
    BindingConsistency,

    /// A debug command failed inside the engine
    #[error("Debug command failed: {0}")]
    CommandFailed(String),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    ChannelClosed,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl BridgeError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        BridgeError::Other(msg.into())
    }

    /// Create a command-execution error
    pub fn command_failed(msg: impl Into<String>) -> Self {
        BridgeError::CommandFailed(msg.into())
    }

    /// Whether this error indicates a defect below the API contract
    /// rather than a recoverable condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::BindingConsistency)
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::AlreadyRunning;
        assert_eq!(err.to_string(), "Debug agent already running");

        let err = BridgeError::CommandFailed("bad request".into());
        assert_eq!(err.to_string(), "Debug command failed: bad request");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(BridgeError::BindingConsistency.is_fatal());
        assert!(!BridgeError::AlreadyRunning.is_fatal());
        assert!(!BridgeError::command_failed("oops").is_fatal());
    }
}
