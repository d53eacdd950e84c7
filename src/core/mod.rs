//! Core types for the debugger bridge
//!
//! This module provides the fundamental types used throughout the crate:
//! - `ExecutionEnvironment` - Opaque handle to an isolated JS context
//! - `AgentState` - Lifecycle state of the debug agent
//! - `DebugMessage` / `MessagePayload` / `Direction` - Cross-thread message types
//! - `BridgeError` - Error types

pub mod env;
pub mod error;
pub mod message;
pub mod state;

pub use env::ExecutionEnvironment;
pub use error::{BridgeError, BridgeResult};
pub use message::{DebugMessage, Direction, MessagePayload};
pub use state::AgentState;
