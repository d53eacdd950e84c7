//! Injected capabilities for command execution and batch dispatch
//!
//! The original design routed commands through raw function pointers. Here
//! both hooks are injected capabilities: an interface-typed command handler
//! and a closure-typed dispatch handler, so tests can supply doubles.

use std::sync::{Arc, Mutex};

use crate::core::{BridgeResult, ExecutionEnvironment};

/// Executes one debug command against the child environment
///
/// Implementations close over the actual engine objects; the bridge only
/// supplies the opaque environment handle and the protocol payload. Runs on
/// the worker thread, one command at a time, outside the channel lock.
pub trait CommandHandler: Send {
    /// Execute a single protocol payload.
    ///
    /// `Ok(Some(response))` publishes a response to the outbound channel,
    /// `Ok(None)` publishes nothing (fire-and-forget commands), and `Err`
    /// is converted into an error-tagged outbound message — engine
    /// exceptions never cross the thread boundary as panics.
    fn execute(
        &mut self,
        env: &ExecutionEnvironment,
        payload: &str,
    ) -> BridgeResult<Option<String>>;
}

/// Any suitable `FnMut` closure is a command handler
impl<F> CommandHandler for F
where
    F: FnMut(&ExecutionEnvironment, &str) -> BridgeResult<Option<String>> + Send,
{
    fn execute(
        &mut self,
        env: &ExecutionEnvironment,
        payload: &str,
    ) -> BridgeResult<Option<String>> {
        self(env, payload)
    }
}

/// Slot holding the command handler between runs of the worker
///
/// The agent fills it at construction; the worker takes the handler during
/// initialization and returns it when its loop exits, so a failed or
/// stopped run leaves the handler available to a later `start`.
pub(crate) type HandlerSlot = Arc<Mutex<Option<Box<dyn CommandHandler>>>>;

/// Embedder callback run after each inbound batch is processed
///
/// Invoked with the *parent* environment handle, giving the embedder a
/// chance to run follow-up logic such as re-entering the parent's own loop.
/// An absent handler is a valid no-op configuration.
pub type DispatchHandler = Arc<dyn Fn(&ExecutionEnvironment) + Send + Sync>;
