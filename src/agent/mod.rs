//! Debugger agent lifecycle and worker loop
//!
//! This module provides the concurrent core of the bridge:
//! - `DebugAgent` - Lifecycle state machine (start / enable / stop)
//! - Worker loop - Drains commands on the dedicated debug thread
//! - `CommandHandler` / `DispatchHandler` - Injected engine capabilities
//!
//! The worker runs as a named OS thread owning a single-threaded event loop;
//! the only cross-thread traffic is `DebugMessage`s on the two channels.

pub mod agent;
pub mod handler;
mod worker;

pub use agent::{DebugAgent, ProtocolSink, DEFAULT_START_TIMEOUT};
pub use handler::{CommandHandler, DispatchHandler};
