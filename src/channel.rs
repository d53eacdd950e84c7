//! Message channel connecting the two environments in one direction
//!
//! A `MessageChannel` is a mutex-guarded, insertion-ordered queue of
//! [`DebugMessage`]s plus a cross-thread wake primitive. Two independent
//! instances exist per agent, one per direction: only the worker ever pops
//! from the inbound channel, only the parent-side loop integration ever pops
//! from the outbound channel. Keeping each direction's ownership unambiguous
//! eliminates lock-ordering bugs between the two sides.
//!
//! The wake primitive coalesces: multiple pushes before the consumer runs
//! may produce a single wake. Consumers therefore drain the *entire* queue
//! on each wake rather than assuming one wake per message.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::core::DebugMessage;

/// One direction of the parent ↔ worker message pipe
///
/// Push is callable from any thread; the lock is held only for the queue
/// mutation itself, never while a message is being processed.
#[derive(Debug, Default)]
pub struct MessageChannel {
    queue: Mutex<VecDeque<DebugMessage>>,
    wake: Notify,
}

impl MessageChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message and raise the wake signal
    pub fn push(&self, message: DebugMessage) {
        {
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.push_back(message);
        }
        // notify_one stores a permit when no consumer is parked, so a push
        // racing the consumer's drain/await window is never lost.
        self.wake.notify_one();
    }

    /// Take every queued message, preserving insertion order
    ///
    /// The lock is released before the returned batch is processed.
    pub fn drain(&self) -> Vec<DebugMessage> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.drain(..).collect()
    }

    /// Wait for the next wake signal
    pub async fn notified(&self) {
        self.wake.notified().await;
    }

    /// Wait until the queue is non-empty, then drain it
    ///
    /// Returns the full batch in insertion order. Because wakes coalesce,
    /// one call may return messages from several pushes.
    pub async fn recv_batch(&self) -> Vec<DebugMessage> {
        loop {
            let batch = self.drain();
            if !batch.is_empty() {
                return batch;
            }
            self.wake.notified().await;
        }
    }

    /// Number of currently queued messages
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::core::MessagePayload;

    #[test]
    fn test_push_then_drain_preserves_order() {
        let channel = MessageChannel::new();
        channel.push(DebugMessage::command("one"));
        channel.push(DebugMessage::command("two"));
        channel.push(DebugMessage::command("three"));

        let batch = channel.drain();
        let payloads: Vec<_> = batch.iter().filter_map(|m| m.protocol()).collect();
        assert_eq!(payloads, vec!["one", "two", "three"]);

        // Drained to empty
        assert!(channel.is_empty());
        assert!(channel.drain().is_empty());
    }

    #[tokio::test]
    async fn test_recv_batch_returns_whole_queue() {
        let channel = MessageChannel::new();
        channel.push(DebugMessage::command("a"));
        channel.push(DebugMessage::command("b"));

        // Two pushes, one batch: the wake coalesced but no message was lost.
        let batch = channel.recv_batch().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].protocol(), Some("a"));
        assert_eq!(batch[1].protocol(), Some("b"));
    }

    #[tokio::test]
    async fn test_recv_batch_wakes_on_cross_thread_push() {
        let channel = Arc::new(MessageChannel::new());

        let producer = channel.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            producer.push(DebugMessage::command("late"));
        });

        let batch = tokio::time::timeout(Duration::from_secs(2), channel.recv_batch())
            .await
            .expect("push should wake the receiver");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].protocol(), Some("late"));

        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_push_before_wait_is_not_lost() {
        let channel = MessageChannel::new();

        // Push with no parked consumer: the permit must be stored so the
        // later notified() returns without a second push.
        channel.push(DebugMessage::shutdown());
        tokio::time::timeout(Duration::from_secs(1), channel.notified())
            .await
            .expect("stored permit should complete the wait");

        let batch = channel.drain();
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch[0].payload, MessagePayload::Shutdown));
    }
}
