//! Worker loop run on the dedicated debug thread
//!
//! The worker owns the child execution environment and its event loop: a
//! single-threaded tokio runtime living entirely on this thread. Commands
//! from the parent arrive on the inbound channel; results and engine events
//! leave through the outbound channel. Nothing else crosses the thread
//! boundary.

use std::sync::mpsc::SyncSender;
use std::sync::Arc;

use crate::agent::handler::{CommandHandler, DispatchHandler, HandlerSlot};
use crate::channel::MessageChannel;
use crate::core::{DebugMessage, ExecutionEnvironment, MessagePayload};

/// Everything the worker thread needs, moved into it at spawn
pub(crate) struct WorkerContext {
    /// Handle to the parent environment (passed to the dispatch handler only)
    pub parent_env: ExecutionEnvironment,
    /// Commands from the parent side
    pub inbound: Arc<MessageChannel>,
    /// Results and events back to the parent side
    pub outbound: Arc<MessageChannel>,
    /// Holds the command handler between runs; the worker takes it during
    /// initialization and returns it on exit
    pub handler_slot: HandlerSlot,
    /// Optional per-batch embedder callback
    pub dispatch_handler: Option<DispatchHandler>,
    /// One-shot readiness signal consumed by `start`, carrying the child
    /// environment handle
    pub ready_tx: SyncSender<Result<ExecutionEnvironment, String>>,
}

/// Thread body: construct the child environment, signal readiness, run the
/// drain loop until the shutdown sentinel, then tear the environment down.
///
/// The command handler leaves the shared slot only here, after the event
/// loop is built, and goes back on every exit path — so a start that fails
/// before this point leaves the handler untouched, and one that fails after
/// gets it back once the worker winds down.
pub(crate) fn run(ctx: WorkerContext) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = ctx
                .ready_tx
                .send(Err(format!("failed to build worker event loop: {e}")));
            return;
        }
    };

    let mut handler = {
        let mut slot = ctx.handler_slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.take() {
            Some(handler) => handler,
            None => {
                // A detached worker from an earlier run still holds it.
                let _ = ctx
                    .ready_tx
                    .send(Err("command handler unavailable".to_string()));
                return;
            }
        }
    };

    let child_env = ExecutionEnvironment::new("debug-child");
    tracing::debug!(env = %child_env, "child execution environment created");

    // Readiness is signalled only after the child environment exists and the
    // loop is about to be entered, so a waiting `start` can never race a
    // `send_command` ahead of worker initialization.
    let _ = ctx.ready_tx.send(Ok(child_env.clone()));

    let WorkerContext {
        parent_env,
        inbound,
        outbound,
        handler_slot,
        dispatch_handler,
        ..
    } = ctx;

    runtime.block_on(drive(
        &child_env,
        &parent_env,
        &inbound,
        &outbound,
        handler.as_mut(),
        dispatch_handler.as_ref(),
    ));

    tracing::debug!(env = %child_env, "worker loop exited; releasing child environment");
    drop(child_env);

    // Hand the handler back so a later start can reuse it.
    let mut slot = handler_slot.lock().unwrap_or_else(|e| e.into_inner());
    *slot = Some(handler);
}

/// The cooperative loop body
///
/// Each iteration drains the entire inbound queue (the channel lock is held
/// for the swap only), executes every command in order with the lock
/// released, publishes results outbound, then runs the dispatch handler for
/// the batch. Terminates when the shutdown sentinel is drained; commands
/// queued ahead of the sentinel still run to completion.
async fn drive(
    child_env: &ExecutionEnvironment,
    parent_env: &ExecutionEnvironment,
    inbound: &MessageChannel,
    outbound: &MessageChannel,
    handler: &mut dyn CommandHandler,
    dispatch_handler: Option<&DispatchHandler>,
) {
    'main: loop {
        let batch = inbound.recv_batch().await;
        let mut shutdown = false;
        let mut processed = 0usize;

        for (index, message) in batch.iter().enumerate() {
            match &message.payload {
                MessagePayload::Shutdown => {
                    let residue = batch.len() - index - 1;
                    if residue > 0 {
                        tracing::warn!(residue, "messages queued after shutdown sentinel dropped");
                    }
                    shutdown = true;
                    break;
                }
                MessagePayload::Protocol(command) => {
                    tracing::trace!(env = %child_env, len = command.len(), "executing debug command");
                    match handler.execute(child_env, command) {
                        Ok(Some(response)) => outbound.push(DebugMessage::response(response)),
                        Ok(None) => {}
                        Err(e) => {
                            // Recovered locally: the failure travels back as
                            // an error-tagged message, never as a panic.
                            tracing::warn!(env = %child_env, error = %e, "debug command failed");
                            outbound.push(DebugMessage::error(e.to_string()));
                        }
                    }
                    processed += 1;
                }
                MessagePayload::Error(text) => {
                    tracing::warn!(error = %text, "unexpected error-tagged message on inbound channel");
                }
            }
        }

        if processed > 0 {
            if let Some(dispatch) = dispatch_handler {
                dispatch(parent_env);
            }
        }

        if shutdown {
            break 'main;
        }
    }
}
