//! Remote-debugging bridge for an embedded JavaScript runtime
//!
//! Lets an external debugger client attach to a running program without
//! stalling its primary thread. The bridge manages a dedicated debugging
//! worker thread, an isolated child execution environment for evaluating
//! debug commands, and the message channels connecting the two sides.
//!
//! The engine itself (protocol parsing, breakpoints, stepping) is an
//! external collaborator reached through the injected [`CommandHandler`];
//! this crate only transports commands and results between the threads.
//!
//! ```ignore
//! let parent = ExecutionEnvironment::new("main");
//! let mut agent = DebugAgent::new(parent, engine_handler);
//! agent.enable();
//! agent.start(5858, true)?;
//!
//! let mut binding = DebuggerBinding::unbound();
//! agent.bind(&mut binding);
//! binding.send_command(r#"{"seq":1,"type":"request","command":"version"}"#)?;
//! // ... responses arrive on agent.outbound()
//! agent.stop();
//! ```

pub mod agent;
pub mod bridge;
pub mod channel;
pub mod core;
pub mod logging;

pub use agent::{CommandHandler, DebugAgent, DispatchHandler, ProtocolSink};
pub use bridge::{AgentLink, DebuggerBinding, WaitGate};
pub use channel::MessageChannel;
pub use core::{
    AgentState, BridgeError, BridgeResult, DebugMessage, Direction, ExecutionEnvironment,
    MessagePayload,
};
