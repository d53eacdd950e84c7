//! Debug message types exchanged between the parent and child environments
//!
//! A `DebugMessage` is the only data that ever crosses the thread boundary.
//! Messages are immutable after construction: a producer builds one, the
//! channel owns it while queued, and the consumer takes ownership on dequeue.

use serde::{Deserialize, Serialize};

/// Direction a message travels between the two environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Parent environment → debug worker (commands)
    ToChild,

    /// Debug worker → parent environment (responses, engine events)
    ToParent,
}

/// Tagged payload carried by a [`DebugMessage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePayload {
    /// An opaque debug-protocol payload (JSON text for both supported engines)
    Protocol(String),

    /// A command failed on the worker; the error text replaces the response
    Error(String),

    /// Worker-loop termination sentinel, pushed by `DebugAgent::stop`
    Shutdown,
}

/// A unit of data shuttled through a [`MessageChannel`](crate::channel::MessageChannel)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugMessage {
    /// Which way this message travels
    pub direction: Direction,
    /// The payload
    pub payload: MessagePayload,
}

impl DebugMessage {
    /// A debug command headed for the worker
    pub fn command(payload: impl Into<String>) -> Self {
        Self {
            direction: Direction::ToChild,
            payload: MessagePayload::Protocol(payload.into()),
        }
    }

    /// A command response or engine event headed back to the parent
    pub fn response(payload: impl Into<String>) -> Self {
        Self {
            direction: Direction::ToParent,
            payload: MessagePayload::Protocol(payload.into()),
        }
    }

    /// An error-tagged result headed back to the parent
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            direction: Direction::ToParent,
            payload: MessagePayload::Error(message.into()),
        }
    }

    /// The shutdown sentinel
    pub fn shutdown() -> Self {
        Self {
            direction: Direction::ToChild,
            payload: MessagePayload::Shutdown,
        }
    }

    /// Whether this is the shutdown sentinel
    pub fn is_shutdown(&self) -> bool {
        matches!(self.payload, MessagePayload::Shutdown)
    }

    /// The protocol payload, if this message carries one
    pub fn protocol(&self) -> Option<&str> {
        match &self.payload {
            MessagePayload::Protocol(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let cmd = DebugMessage::command("{\"cmd\":\"ping\"}");
        assert_eq!(cmd.direction, Direction::ToChild);
        assert_eq!(cmd.protocol(), Some("{\"cmd\":\"ping\"}"));

        let resp = DebugMessage::response("{\"status\":\"ok\"}");
        assert_eq!(resp.direction, Direction::ToParent);

        let err = DebugMessage::error("engine exception");
        assert_eq!(err.direction, Direction::ToParent);
        assert!(err.protocol().is_none());

        assert!(DebugMessage::shutdown().is_shutdown());
        assert!(!cmd.is_shutdown());
    }

    #[test]
    fn test_serde_round_trip() {
        let msg = DebugMessage::command("{\"seq\":1}");
        let json = serde_json::to_string(&msg).unwrap();
        let back: DebugMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
