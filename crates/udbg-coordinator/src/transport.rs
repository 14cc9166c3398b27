//! Outbound transport seam
//!
//! The coordinator only needs a fire-and-forget `send(messageType, payload)`.
//! Delivery, framing and reconnects belong to the transport.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Transport failures, surfaced unchanged to callers
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Peer side of the channel is gone
    #[error("transport closed")]
    Closed,

    /// Payload could not be encoded
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport refused the message
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Generic message sink
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Send one message. Must not block.
    ///
    /// # Errors
    /// Implementation-specific; never retried by the caller.
    fn send(&self, message_type: &str, payload: serde_json::Value) -> Result<(), TransportError>;
}

/// Message as handed to the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Message type tag
    pub message_type: String,
    /// Message body
    pub payload: serde_json::Value,
}

/// Transport backed by an unbounded in-process channel
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelTransport {
    /// Create a transport and the receiver that drains it
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, message_type: &str, payload: serde_json::Value) -> Result<(), TransportError> {
        self.tx
            .send(OutboundMessage {
                message_type: message_type.to_string(),
                payload,
            })
            .map_err(|_| TransportError::Closed)
    }
}
