//! Command dispatcher
//!
//! Wraps a [`DebugCommand`] into a [`DebugCommandRequest`] and hands it to the
//! transport. Nothing is awaited: confirmation, if any, arrives later as an
//! unrelated console line.

use crate::command::{DebugCommand, DebugCommandRequest};
use crate::transport::{Transport, TransportError};
use std::fmt;
use std::sync::Arc;

/// Default message type for debug command requests
pub const DEBUG_COMMAND_MESSAGE_TYPE: &str = "DebugCommandRequest";

/// Sends typed debug commands to individual workers
#[derive(Clone)]
pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    message_type: String,
}

impl CommandDispatcher {
    /// Dispatcher using the default message type
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_message_type(transport, DEBUG_COMMAND_MESSAGE_TYPE)
    }

    /// Dispatcher using a custom message type
    #[must_use]
    pub fn with_message_type(transport: Arc<dyn Transport>, message_type: impl Into<String>) -> Self {
        Self {
            transport,
            message_type: message_type.into(),
        }
    }

    /// Message type attached to every request
    #[inline]
    #[must_use]
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Send `command` to one worker
    ///
    /// # Errors
    /// - `TransportError` from encoding or from the transport itself
    pub fn dispatch(
        &self,
        operator_id: &str,
        worker_id: &str,
        command: &DebugCommand,
    ) -> Result<(), TransportError> {
        let request = DebugCommandRequest::new(operator_id, worker_id, command);
        let payload = serde_json::to_value(&request)?;

        tracing::debug!(operator_id, worker_id, cmd = %command, "dispatching debug command");
        self.transport.send(&self.message_type, payload)
    }

    /// Send `command` to each worker in turn, stopping at the first failure
    ///
    /// # Errors
    /// - `TransportError` from the first failing send
    pub fn dispatch_all<S: AsRef<str>>(
        &self,
        operator_id: &str,
        workers: &[S],
        command: &DebugCommand,
    ) -> Result<(), TransportError> {
        workers
            .iter()
            .try_for_each(|worker| self.dispatch(operator_id, worker.as_ref(), command))
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("message_type", &self.message_type)
            .finish_non_exhaustive()
    }
}
