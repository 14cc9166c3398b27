//! Event loop over the coordinator's inbound notification streams
//!
//! Lifecycle announcements are drained before status updates, and status
//! updates before console batches, whenever more than one is ready. Handler
//! failures are logged and the loop keeps going; it ends once every stream
//! is exhausted.

use crate::coordinator::DebugCoordinator;
use crate::status::{ExecutionStatusUpdate, OperatorDescriptor};
use futures::{Stream, StreamExt};
use udbg_console::ConsoleUpdateEvent;

/// Counters reported when the event loop finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactorSummary {
    /// Operators registered from lifecycle announcements
    pub operators_registered: usize,
    /// Stores cleared by reset status updates
    pub stores_cleared: usize,
    /// Console batches applied
    pub console_batches: usize,
    /// Console batches that failed
    pub console_errors: usize,
}

impl DebugCoordinator {
    /// Run until all three streams end
    pub async fn run<L, S, C>(&self, lifecycle: L, status: S, console: C) -> ReactorSummary
    where
        L: Stream<Item = OperatorDescriptor> + Unpin,
        S: Stream<Item = ExecutionStatusUpdate> + Unpin,
        C: Stream<Item = ConsoleUpdateEvent> + Unpin,
    {
        let mut lifecycle = lifecycle.fuse();
        let mut status = status.fuse();
        let mut console = console.fuse();
        let mut summary = ReactorSummary::default();

        tracing::info!("debug coordinator started");
        loop {
            tokio::select! {
                biased;
                Some(operator) = lifecycle.next() => {
                    if self.handle_operator_added(&operator) {
                        summary.operators_registered += 1;
                    }
                }
                Some(update) = status.next() => {
                    summary.stores_cleared += self.handle_status_update(&update);
                }
                Some(batch) = console.next() => {
                    match self.handle_console_update(&batch) {
                        Ok(()) => summary.console_batches += 1,
                        Err(e) => {
                            summary.console_errors += 1;
                            tracing::warn!(
                                operator_id = %batch.operator_id,
                                error = %e,
                                "failed to apply console update"
                            );
                        }
                    }
                }
                else => break,
            }
        }
        tracing::info!(?summary, "debug coordinator stopped");
        summary
    }
}
