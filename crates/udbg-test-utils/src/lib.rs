//! Testing utilities for the UDBG workspace
//!
//! Recording transport, fixed worker sets and console fixtures.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::sync::Arc;
use udbg_console::{ConsoleMessage, ConsoleUpdateEvent};
use udbg_coordinator::{
    CoordinatorConfig, DebugCommand, DebugCommandRequest, DebugCoordinator, OutboundMessage,
    Transport, TransportError, WorkerRegistry,
};

pub const UDF_OPERATOR: &str = "PythonUDFV2-operator-1";
pub const UDF_OPERATOR_TYPE: &str = "PythonUDFV2";
pub const SCRIPT_PATH: &str = "/tmp/udf/operator.py";

/// Transport that keeps every message it is handed
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    failing: Mutex<bool>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make subsequent sends fail with `TransportError::Closed`
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    pub fn requests(&self) -> Vec<DebugCommandRequest> {
        self.sent
            .lock()
            .iter()
            .map(|m| serde_json::from_value(m.payload.clone()).unwrap())
            .collect()
    }

    /// `(worker, command)` pairs in send order
    pub fn commands(&self) -> Vec<(String, DebugCommand)> {
        self.requests()
            .into_iter()
            .map(|r| {
                let cmd = r.command().unwrap();
                (r.worker_id, cmd)
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&self, message_type: &str, payload: serde_json::Value) -> Result<(), TransportError> {
        if *self.failing.lock() {
            return Err(TransportError::Closed);
        }
        self.sent.lock().push(OutboundMessage {
            message_type: message_type.to_string(),
            payload,
        });
        Ok(())
    }
}

/// Same worker set for every operator
#[derive(Debug, Clone, Default)]
pub struct StaticWorkers(pub Vec<String>);

impl StaticWorkers {
    pub fn of(workers: &[&str]) -> Arc<Self> {
        Arc::new(Self(workers.iter().map(|w| (*w).to_string()).collect()))
    }
}

impl WorkerRegistry for StaticWorkers {
    fn worker_ids(&self, _operator_id: &str) -> Vec<String> {
        self.0.clone()
    }
}

/// Coordinator with default config, `UDF_OPERATOR` registered
pub fn setup_coordinator(workers: &[&str]) -> (DebugCoordinator, Arc<RecordingTransport>) {
    setup_coordinator_with_config(CoordinatorConfig::new(), workers)
}

pub fn setup_coordinator_with_config(
    config: CoordinatorConfig,
    workers: &[&str],
) -> (DebugCoordinator, Arc<RecordingTransport>) {
    let transport = RecordingTransport::new();
    let coordinator = DebugCoordinator::new(
        config,
        Arc::clone(&transport) as Arc<dyn Transport>,
        StaticWorkers::of(workers),
    );
    coordinator.register(UDF_OPERATOR);
    (coordinator, transport)
}

/// One-message console batch for `UDF_OPERATOR`
pub fn console_batch(worker_id: &str, title: &str) -> ConsoleUpdateEvent {
    ConsoleUpdateEvent::new(UDF_OPERATOR, vec![ConsoleMessage::debugger(worker_id, title)])
}

pub fn created_line(breakpoint_id: u32, line: u32) -> String {
    format!("Breakpoint {breakpoint_id} at {SCRIPT_PATH}:{line}")
}

pub fn deleted_line(breakpoint_id: u32, line: u32) -> String {
    format!("Deleted breakpoint {breakpoint_id} at {SCRIPT_PATH}:{line}")
}

pub fn paused_line(line: u32) -> String {
    format!("> {SCRIPT_PATH}({line})process()")
}
