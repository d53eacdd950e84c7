//! DebugAgent - lifecycle state machine for the remote-debugging bridge
//!
//! The agent owns both message channels, the parent environment handle, and
//! the worker thread. `start` spawns the worker (optionally blocking until it
//! signals readiness), `enable` installs protocol interception, `stop` joins
//! the worker and releases the child environment.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::agent::handler::{CommandHandler, DispatchHandler, HandlerSlot};
use crate::agent::worker::{self, WorkerContext};
use crate::bridge::{AgentLink, DebuggerBinding, WaitGate};
use crate::channel::MessageChannel;
use crate::core::{AgentState, BridgeError, BridgeResult, DebugMessage, ExecutionEnvironment};

/// Default bound on `start(port, wait = true)`
///
/// The original design waited indefinitely; an unresponsive worker would
/// hang the caller, so the blocking start path carries a timeout here.
/// Override with [`DebugAgent::set_start_timeout`].
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(10);

/// Protocol interception sink installed by [`DebugAgent::enable`]
///
/// The engine's message callback calls [`ProtocolSink::submit`] to route
/// incoming protocol data onto the inbound channel. Cloneable and callable
/// from the owner thread.
#[derive(Clone)]
pub struct ProtocolSink {
    inbound: Arc<MessageChannel>,
}

impl ProtocolSink {
    /// Route one protocol payload to the debug worker
    pub fn submit(&self, payload: impl Into<String>) {
        self.inbound.push(DebugMessage::command(payload));
    }
}

impl std::fmt::Debug for ProtocolSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolSink")
            .field("queued", &self.inbound.len())
            .finish()
    }
}

/// The debugger agent
///
/// Constructed bound to the parent environment, which the embedder supplies
/// and which outlives the agent. All lifecycle methods take `&mut self`:
/// `start` and `stop` are serialized by the borrow checker, so the shutdown
/// races of the original design cannot be expressed.
pub struct DebugAgent {
    state: AgentState,
    port: u16,
    parent_env: ExecutionEnvironment,
    /// Handle to the child environment, once the worker has reported it
    child_env: Option<ExecutionEnvironment>,

    /// Parent → worker (commands); only the worker pops
    inbound: Arc<MessageChannel>,
    /// Worker → parent (responses, events); only the parent-side loop pops
    outbound: Arc<MessageChannel>,

    /// Slot shared with the worker thread, which takes the handler during
    /// initialization and hands it back on exit. A failed start therefore
    /// leaves the handler reclaimable and the agent startable again.
    command_handler: HandlerSlot,
    dispatch_handler: Option<DispatchHandler>,

    start_timeout: Duration,
    listening: Arc<AtomicBool>,
    wait_gate: Arc<WaitGate>,

    /// Set by `enable`, cleared by `stop`
    sink: Option<ProtocolSink>,
    worker: Option<JoinHandle<()>>,
}

impl DebugAgent {
    /// Create an agent bound to the parent environment
    ///
    /// `command_handler` executes debug commands against the child
    /// environment on the worker thread.
    pub fn new(parent_env: ExecutionEnvironment, command_handler: impl CommandHandler + 'static) -> Self {
        Self {
            state: AgentState::Stopped,
            port: 0,
            parent_env,
            child_env: None,
            inbound: Arc::new(MessageChannel::new()),
            outbound: Arc::new(MessageChannel::new()),
            command_handler: Arc::new(Mutex::new(Some(Box::new(command_handler)))),
            dispatch_handler: None,
            start_timeout: DEFAULT_START_TIMEOUT,
            listening: Arc::new(AtomicBool::new(false)),
            wait_gate: Arc::new(WaitGate::new()),
            sink: None,
            worker: None,
        }
    }

    /// Set the per-batch dispatch handler
    ///
    /// Must be called before `start` for deterministic effect: the handler
    /// is moved to the worker thread at spawn.
    pub fn set_dispatch_handler(&mut self, handler: DispatchHandler) {
        self.dispatch_handler = Some(handler);
    }

    /// Override the bound on the `wait = true` start path
    pub fn set_start_timeout(&mut self, timeout: Duration) {
        self.start_timeout = timeout;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start the debugger agent thread
    ///
    /// `port` is advisory metadata passed through to the runtime's own
    /// listener; the agent does not bind it. With `wait = true` the call
    /// blocks until the worker has constructed its child environment and
    /// entered its loop, bounded by the start timeout.
    ///
    /// Fails with [`BridgeError::AlreadyRunning`] on a double start and with
    /// [`BridgeError::ThreadSpawn`] if the OS refuses the thread; spawn
    /// failure is reported once, never retried. A failed start leaves the
    /// agent unchanged: the command handler stays reclaimable, so a later
    /// `start` can succeed.
    ///
    /// With `wait = false` the `Running` invariant is weakened: an init
    /// failure the worker reports after this call returns leaves the agent
    /// `Running` with no live loop until `stop` joins the dead thread. A
    /// failure already reported by the time `start` runs is still caught.
    pub fn start(&mut self, port: u16, wait: bool) -> BridgeResult<()> {
        if self.state.is_running() {
            return Err(BridgeError::AlreadyRunning);
        }
        {
            let slot = self.command_handler.lock().unwrap_or_else(|e| e.into_inner());
            if slot.is_none() {
                // Still held by a detached worker from a timed-out start.
                return Err(BridgeError::NotConfigured("command handler"));
            }
        }

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let ctx = WorkerContext {
            parent_env: self.parent_env.clone(),
            inbound: self.inbound.clone(),
            outbound: self.outbound.clone(),
            handler_slot: self.command_handler.clone(),
            dispatch_handler: self.dispatch_handler.clone(),
            ready_tx,
        };

        let spawned = std::thread::Builder::new()
            .name("debug-agent-worker".to_string())
            .spawn(move || worker::run(ctx));

        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                // Reported once to the caller, never retried internally.
                // The handler never left the slot.
                tracing::error!(error = %e, "failed to spawn debug worker thread");
                return Err(BridgeError::ThreadSpawn(e));
            }
        };

        match Self::await_worker_ready(&ready_rx, wait, self.start_timeout) {
            Ok(child_env) => self.child_env = child_env,
            Err(e @ BridgeError::StartTimeout) => {
                // Best effort: ask the stuck worker to exit, but do not
                // block the caller on it. The worker returns the command
                // handler to the slot when it winds down.
                self.inbound.push(DebugMessage::shutdown());
                tracing::error!(timeout = ?self.start_timeout, "debug worker did not become ready");
                return Err(e);
            }
            Err(e) => {
                // Worker reported an init failure and is exiting on its own.
                let _ = worker.join();
                return Err(e);
            }
        }

        self.port = port;
        self.worker = Some(worker);
        self.state = AgentState::Running;
        tracing::info!(port, wait, "debug agent started");
        Ok(())
    }

    /// Consume the worker's readiness signal
    ///
    /// A waiting start blocks up to `timeout` for the child environment
    /// handle; a non-waiting start only polls, catching an init failure the
    /// worker has already reported, and returns `Ok(None)` when the worker
    /// simply has not signalled yet.
    fn await_worker_ready(
        ready_rx: &mpsc::Receiver<Result<ExecutionEnvironment, String>>,
        wait: bool,
        timeout: Duration,
    ) -> BridgeResult<Option<ExecutionEnvironment>> {
        if wait {
            match ready_rx.recv_timeout(timeout) {
                Ok(Ok(child_env)) => Ok(Some(child_env)),
                Ok(Err(reason)) => Err(BridgeError::WorkerInit(reason)),
                Err(mpsc::RecvTimeoutError::Disconnected) => Err(BridgeError::WorkerInit(
                    "worker exited before signalling readiness".into(),
                )),
                Err(mpsc::RecvTimeoutError::Timeout) => Err(BridgeError::StartTimeout),
            }
        } else {
            match ready_rx.try_recv() {
                Ok(Ok(child_env)) => Ok(Some(child_env)),
                Ok(Err(reason)) => Err(BridgeError::WorkerInit(reason)),
                Err(mpsc::TryRecvError::Disconnected) => Err(BridgeError::WorkerInit(
                    "worker exited before signalling readiness".into(),
                )),
                Err(mpsc::TryRecvError::Empty) => Ok(None),
            }
        }
    }

    /// Activate protocol interception
    ///
    /// Installs the sink that routes engine protocol data onto the inbound
    /// channel; fetch it with [`DebugAgent::protocol_sink`]. Idempotent: the
    /// embedder may call this speculatively, so a second call within one
    /// running period is a logged no-op.
    pub fn enable(&mut self) {
        if self.sink.is_some() {
            tracing::debug!("debug agent already enabled");
            return;
        }
        self.sink = Some(ProtocolSink {
            inbound: self.inbound.clone(),
        });
        tracing::info!("debug agent enabled; protocol interception installed");
    }

    /// Stop the debugger agent
    ///
    /// Pushes the shutdown sentinel, joins the worker thread, and returns
    /// the agent to `Stopped`. Blocks until the worker has fully exited, so
    /// no use of the child environment survives the call. The worker hands
    /// the command handler back on exit, so a stopped agent can be started
    /// again. Safe to call if `start` never succeeded: that case is a no-op.
    pub fn stop(&mut self) {
        if !self.state.is_running() {
            tracing::trace!("stop on a non-running debug agent is a no-op");
            return;
        }

        self.inbound.push(DebugMessage::shutdown());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("debug worker thread panicked during shutdown");
            }
        }

        self.sink = None;
        self.child_env = None;
        self.state = AgentState::Stopped;
        tracing::info!("debug agent stopped");
    }

    // =========================================================================
    // Accessors & wiring
    // =========================================================================

    /// Current lifecycle state
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Advisory debug port passed to the last successful `start`
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Handle to the parent environment
    pub fn parent_env(&self) -> &ExecutionEnvironment {
        &self.parent_env
    }

    /// Handle to the child environment, when known
    ///
    /// Always populated after a successful waiting start; a non-waiting
    /// start learns it only if the worker signalled readiness before
    /// `start` returned. Cleared by `stop`.
    pub fn child_env(&self) -> Option<&ExecutionEnvironment> {
        self.child_env.as_ref()
    }

    /// The interception sink, if `enable` has been called
    pub fn protocol_sink(&self) -> Option<ProtocolSink> {
        self.sink.clone()
    }

    /// Outbound channel for the parent-side loop integration
    ///
    /// This is the only way data returns from the worker; the embedder's
    /// loop awaits its wake and drains it to empty.
    pub fn outbound(&self) -> Arc<MessageChannel> {
        self.outbound.clone()
    }

    /// Build the link a [`DebuggerBinding`] needs to reach this agent
    pub fn link(&self) -> AgentLink {
        AgentLink::new(
            self.inbound.clone(),
            self.listening.clone(),
            self.wait_gate.clone(),
        )
    }

    /// Attach this agent to a binding object
    pub fn bind(&self, binding: &mut DebuggerBinding) {
        binding.attach(self.link());
    }

    /// Block until a debugger client connects (`notify_wait` fires)
    ///
    /// This is the `wait = true` path of the surrounding runtime: after a
    /// waiting start, the embedder parks here until the bridge reports the
    /// blocking wait satisfied.
    pub fn wait_for_connection(&self, timeout: Duration) -> BridgeResult<()> {
        if self.wait_gate.wait(timeout) {
            Ok(())
        } else {
            Err(BridgeError::ConnectTimeout)
        }
    }
}

impl Drop for DebugAgent {
    fn drop(&mut self) {
        // The agent must not outlive its worker thread.
        self.stop();
    }
}

impl std::fmt::Debug for DebugAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugAgent")
            .field("state", &self.state)
            .field("port", &self.port)
            .field("parent_env", &self.parent_env)
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}
