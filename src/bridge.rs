//! Bridge entry points reachable from the parent environment's scripting surface
//!
//! The embedding runtime exposes three functions to JavaScript running in the
//! parent environment: `notifyListen`, `notifyWait`, and `sendCommand`. Each
//! is backed by a [`DebuggerBinding`] the runtime installs on its binding
//! object. The binding unwraps the [`AgentLink`] tying it to a live agent and
//! delegates; an absent link is a binding-layer defect and surfaces as the
//! fatal [`BridgeError::BindingConsistency`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::channel::MessageChannel;
use crate::core::{BridgeError, BridgeResult, DebugMessage};

/// One-shot gate released when a debugger client connects
///
/// The owner thread parks on the gate after a waiting start; `notify_wait`
/// releases it. Releasing an already-released gate is harmless.
#[derive(Debug, Default)]
pub struct WaitGate {
    released: Mutex<bool>,
    cv: Condvar,
}

impl WaitGate {
    /// Create an unreleased gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the gate, waking every waiter
    pub fn release(&self) {
        let mut released = self.released.lock().unwrap_or_else(|e| e.into_inner());
        *released = true;
        self.cv.notify_all();
    }

    /// Block until the gate is released; returns false on timeout
    pub fn wait(&self, timeout: Duration) -> bool {
        let released = self.released.lock().unwrap_or_else(|e| e.into_inner());
        let (released, _timed_out) = self
            .cv
            .wait_timeout_while(released, timeout, |released| !*released)
            .unwrap_or_else(|e| e.into_inner());
        *released
    }

    /// Check the gate without blocking
    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Cheap connection from a binding object to its agent
///
/// Carries only what the entry points need: the inbound channel, the
/// listening flag, and the wait gate. Cloning shares all three.
#[derive(Clone)]
pub struct AgentLink {
    inbound: Arc<MessageChannel>,
    listening: Arc<AtomicBool>,
    wait_gate: Arc<WaitGate>,
}

impl AgentLink {
    pub(crate) fn new(
        inbound: Arc<MessageChannel>,
        listening: Arc<AtomicBool>,
        wait_gate: Arc<WaitGate>,
    ) -> Self {
        Self {
            inbound,
            listening,
            wait_gate,
        }
    }
}

impl std::fmt::Debug for AgentLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLink")
            .field("listening", &self.listening.load(Ordering::SeqCst))
            .field("queued", &self.inbound.len())
            .finish()
    }
}

/// Native backing of the JavaScript-facing debugger binding object
///
/// Created unbound, then attached to an agent with
/// [`DebugAgent::bind`](crate::agent::DebugAgent::bind).
#[derive(Debug, Default)]
pub struct DebuggerBinding {
    link: Option<AgentLink>,
}

impl DebuggerBinding {
    /// Create a binding with no associated agent
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Associate this binding with an agent
    pub fn attach(&mut self, link: AgentLink) {
        self.link = Some(link);
    }

    /// Whether an agent is attached
    pub fn is_bound(&self) -> bool {
        self.link.is_some()
    }

    fn link(&self) -> BridgeResult<&AgentLink> {
        self.link.as_ref().ok_or(BridgeError::BindingConsistency)
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Confirm the debugger's listening socket is bound
    ///
    /// Informational: the socket itself is opened by the runtime's listener,
    /// not by the agent.
    pub fn notify_listen(&self) -> BridgeResult<()> {
        let link = self.link()?;
        link.listening.store(true, Ordering::SeqCst);
        tracing::info!("debugger listening socket bound");
        Ok(())
    }

    /// Signal that the blocking connection wait has been satisfied
    pub fn notify_wait(&self) -> BridgeResult<()> {
        let link = self.link()?;
        link.wait_gate.release();
        tracing::debug!("debugger connection wait satisfied");
        Ok(())
    }

    /// Enqueue a debug command for the worker
    ///
    /// Returns immediately; the response, if any, arrives later on the
    /// agent's outbound channel.
    pub fn send_command(&self, payload: impl Into<String>) -> BridgeResult<()> {
        let link = self.link()?;
        link.inbound.push(DebugMessage::command(payload));
        Ok(())
    }

    /// Whether `notify_listen` has fired
    pub fn is_listening(&self) -> bool {
        self.link
            .as_ref()
            .map(|link| link.listening.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MessagePayload;

    fn test_link() -> (AgentLink, Arc<MessageChannel>) {
        let inbound = Arc::new(MessageChannel::new());
        let link = AgentLink::new(
            inbound.clone(),
            Arc::new(AtomicBool::new(false)),
            Arc::new(WaitGate::new()),
        );
        (link, inbound)
    }

    #[test]
    fn test_unbound_calls_are_fatal() {
        let binding = DebuggerBinding::unbound();
        assert!(!binding.is_bound());

        let err = binding.send_command("{}").unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, BridgeError::BindingConsistency));

        assert!(matches!(
            binding.notify_listen().unwrap_err(),
            BridgeError::BindingConsistency
        ));
        assert!(matches!(
            binding.notify_wait().unwrap_err(),
            BridgeError::BindingConsistency
        ));
    }

    #[test]
    fn test_send_command_enqueues_inbound() {
        let (link, inbound) = test_link();
        let mut binding = DebuggerBinding::unbound();
        binding.attach(link);

        binding.send_command("{\"cmd\":\"ping\"}").unwrap();

        let batch = inbound.drain();
        assert_eq!(batch.len(), 1);
        assert!(matches!(
            &batch[0].payload,
            MessagePayload::Protocol(text) if text == "{\"cmd\":\"ping\"}"
        ));
    }

    #[test]
    fn test_notify_listen_sets_flag() {
        let (link, _inbound) = test_link();
        let mut binding = DebuggerBinding::unbound();
        binding.attach(link);

        assert!(!binding.is_listening());
        binding.notify_listen().unwrap();
        assert!(binding.is_listening());
    }

    #[test]
    fn test_wait_gate_releases_waiter() {
        let gate = Arc::new(WaitGate::new());
        assert!(!gate.is_released());
        assert!(!gate.wait(Duration::from_millis(10)));

        let waiter = {
            let gate = gate.clone();
            std::thread::spawn(move || gate.wait(Duration::from_secs(5)))
        };
        std::thread::sleep(Duration::from_millis(20));
        gate.release();
        assert!(waiter.join().unwrap());

        // Already released: waiting returns immediately.
        assert!(gate.wait(Duration::from_millis(1)));
        gate.release();
        assert!(gate.is_released());
    }

    #[test]
    fn test_notify_wait_releases_gate() {
        let inbound = Arc::new(MessageChannel::new());
        let gate = Arc::new(WaitGate::new());
        let link = AgentLink::new(inbound, Arc::new(AtomicBool::new(false)), gate.clone());

        let mut binding = DebuggerBinding::unbound();
        binding.attach(link);
        binding.notify_wait().unwrap();

        assert!(gate.is_released());
    }
}
