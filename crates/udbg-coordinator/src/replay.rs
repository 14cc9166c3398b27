//! Offline replay of recorded console batches
//!
//! Feeds a JSON-lines recording of [`ConsoleUpdateEvent`]s through a fresh
//! coordinator and captures every command it dispatches together with the
//! final breakpoint map.

use crate::config::CoordinatorConfig;
use crate::coordinator::DebugCoordinator;
use crate::error::DebugError;
use crate::reactor::ReactorSummary;
use crate::status::{ExecutionStatusUpdate, OperatorDescriptor};
use crate::transport::ChannelTransport;
use crate::workers::WorkerTable;
use futures::stream;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::sync::Arc;
use udbg_console::ConsoleUpdateEvent;
use udbg_store::BreakpointState;

/// Replay input and output failures
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Recording or output stream failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A recorded line is not a console update
    #[error("{origin}:{line}: invalid console update: {error}")]
    InvalidBatch {
        /// Name of the recording, usually its path
        origin: String,
        /// 1-based line number
        line: usize,
        /// Decoder failure
        error: serde_json::Error,
    },

    /// Output could not be encoded
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Operator and workers a recording belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayTarget {
    /// Operator id
    pub operator_id: String,
    /// Operator type announced on the lifecycle stream
    pub operator_type: String,
    /// Workers of the operator
    pub workers: Vec<String>,
}

impl ReplayTarget {
    /// Target with no workers
    #[must_use]
    pub fn new(operator_id: impl Into<String>, operator_type: impl Into<String>) -> Self {
        Self {
            operator_id: operator_id.into(),
            operator_type: operator_type.into(),
            workers: Vec::new(),
        }
    }

    /// With workers
    #[must_use]
    pub fn with_workers<I, S>(mut self, workers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workers = workers.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of a replay
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutput {
    /// Dispatched command payloads in send order
    pub commands: Vec<serde_json::Value>,
    /// Breakpoint map after the last batch
    pub state: BTreeMap<String, BreakpointState>,
    /// Reactor counters
    pub summary: ReactorSummary,
}

impl ReplayOutput {
    /// One JSON line per command, then one line with the final map
    ///
    /// # Errors
    /// - `ReplayError` if encoding or writing fails
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), ReplayError> {
        for command in &self.commands {
            serde_json::to_writer(&mut *out, command)?;
            writeln!(out)?;
        }
        serde_json::to_writer(&mut *out, &self.state)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Parse a JSON-lines recording, skipping blank lines
///
/// # Errors
/// - `ReplayError::Io` if reading fails
/// - `ReplayError::InvalidBatch` naming `origin` and the offending line
pub fn read_batches<R: BufRead>(
    reader: R,
    origin: &str,
) -> Result<Vec<ConsoleUpdateEvent>, ReplayError> {
    let mut batches = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let batch = serde_json::from_str(&line).map_err(|error| ReplayError::InvalidBatch {
            origin: origin.to_string(),
            line: index + 1,
            error,
        })?;
        batches.push(batch);
    }
    Ok(batches)
}

/// Run `batches` through a coordinator tracking `target`
///
/// # Errors
/// - `DebugError::Store` if `target.operator_type` is not a configured UDF type
pub async fn replay(
    config: CoordinatorConfig,
    target: &ReplayTarget,
    batches: Vec<ConsoleUpdateEvent>,
) -> Result<ReplayOutput, DebugError> {
    tracing::info!(
        operator_id = %target.operator_id,
        batches = batches.len(),
        workers = target.workers.len(),
        "replaying console batches"
    );

    let table = Arc::new(WorkerTable::new());
    table.set_workers(&target.operator_id, target.workers.iter().cloned());
    let (transport, mut outbound) = ChannelTransport::channel();
    let coordinator = DebugCoordinator::new(config, Arc::new(transport), table);

    let summary = coordinator
        .run(
            stream::iter([OperatorDescriptor::new(
                target.operator_id.as_str(),
                target.operator_type.as_str(),
            )]),
            stream::iter(Vec::<ExecutionStatusUpdate>::new()),
            stream::iter(batches),
        )
        .await;

    let mut commands = Vec::new();
    while let Ok(message) = outbound.try_recv() {
        commands.push(message.payload);
    }

    let state = coordinator
        .get_debug_state(&target.operator_id)?
        .entries()
        .into_iter()
        .collect();

    Ok(ReplayOutput {
        commands,
        state,
        summary,
    })
}
