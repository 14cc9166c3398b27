//! Debug Coordinator
//!
//! Bridges the per-operator breakpoint store, the debugger console stream and
//! the per-worker command channel.
//!
//! # Breakpoint lifecycle (per operator and line)
//!
//! - Adding or removing a breakpoint only sends `break`/`clear`; the store
//!   changes when the debugger confirms with a `Created`/`Deleted` line.
//! - Editing a condition sends `condition` and updates the store at once.
//! - A `Paused` line marks the entry hit, creating it if needed.
//! - A `Deleted` line removes the entry, unless it is hit, in which case the
//!   entry stays with its breakpoint id cleared.
//!
//! After every console line the operator's store is scanned; if nothing is
//! hit, every known worker of the operator is told to `continue`.

use crate::command::DebugCommand;
use crate::config::CoordinatorConfig;
use crate::dispatcher::CommandDispatcher;
use crate::error::DebugError;
use crate::status::{ExecutionStatusUpdate, OperatorDescriptor};
use crate::transport::Transport;
use crate::workers::WorkerRegistry;
use std::fmt;
use std::sync::Arc;
use udbg_console::{ConsoleUpdateEvent, DebugEvent};
use udbg_store::{line_key, BreakpointState, BreakpointStore, DebugStateHandle, DebugStateMap};

/// Interactive debug coordinator for UDF operators
pub struct DebugCoordinator {
    config: CoordinatorConfig,
    store: BreakpointStore,
    dispatcher: CommandDispatcher,
    workers: Arc<dyn WorkerRegistry>,
}

impl DebugCoordinator {
    /// Create a coordinator with no registered operators
    #[must_use]
    pub fn new(
        config: CoordinatorConfig,
        transport: Arc<dyn Transport>,
        workers: Arc<dyn WorkerRegistry>,
    ) -> Self {
        let dispatcher =
            CommandDispatcher::with_message_type(transport, config.command_message_type.clone());
        let store = BreakpointStore::new(config.store_mode.clone());

        Self {
            config,
            store,
            dispatcher,
            workers,
        }
    }

    /// Register every UDF operator already present in the workflow
    #[must_use]
    pub fn with_operators<'a>(self, operators: impl IntoIterator<Item = &'a OperatorDescriptor>) -> Self {
        for operator in operators {
            self.handle_operator_added(operator);
        }
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Underlying breakpoint store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &BreakpointStore {
        &self.store
    }

    /// Allocate the debug state for `operator_id` regardless of its type
    pub fn register(&self, operator_id: &str) -> DebugStateHandle {
        if !self.store.contains(operator_id) {
            tracing::info!(operator_id, "registering operator for debugging");
        }
        self.store.create(operator_id)
    }

    /// Lifecycle hook: register the operator if it is a UDF operator.
    ///
    /// Returns whether the operator is tracked.
    pub fn handle_operator_added(&self, operator: &OperatorDescriptor) -> bool {
        if !self.config.is_udf_type(&operator.operator_type) {
            tracing::trace!(
                operator_id = %operator.operator_id,
                operator_type = %operator.operator_type,
                "ignoring non-UDF operator"
            );
            return false;
        }
        self.register(&operator.operator_id);
        true
    }

    /// Status hook: clear the store of every registered operator that moved
    /// to the reset state. Returns the number of stores cleared.
    pub fn handle_status_update(&self, update: &ExecutionStatusUpdate) -> usize {
        let mut cleared = 0;
        for (operator_id, stats) in update {
            if !stats.operator_state.is_reset() {
                continue;
            }
            match self.store.clear(operator_id) {
                Ok(()) => {
                    tracing::info!(operator_id = %operator_id, "execution reset, debug state cleared");
                    cleared += 1;
                }
                Err(_) => {
                    tracing::trace!(operator_id = %operator_id, "reset for untracked operator");
                }
            }
        }
        cleared
    }

    /// Console hook: apply each line to the store in arrival order, running
    /// the resume scan after every line.
    ///
    /// # Errors
    /// - `DebugError::Store` if the operator was never registered
    /// - `DebugError::Transport` if a resume command cannot be sent
    pub fn handle_console_update(&self, batch: &ConsoleUpdateEvent) -> Result<(), DebugError> {
        let state = self.get_debug_state(&batch.operator_id)?;

        for message in &batch.messages {
            let event = message.event();
            tracing::debug!(
                operator_id = %batch.operator_id,
                worker_id = %message.worker_id,
                ?event,
                "debugger console event"
            );
            apply_event(state.as_ref(), event);
            self.resume_if_idle(&batch.operator_id, state.as_ref())?;
        }
        Ok(())
    }

    /// Breakpoint map of `operator_id`
    ///
    /// # Errors
    /// - `DebugError::Store` (`NotInitialized`) if the operator was never registered
    pub fn get_debug_state(&self, operator_id: &str) -> Result<DebugStateHandle, DebugError> {
        Ok(self.store.get(operator_id)?)
    }

    /// Condition of the breakpoint with `breakpoint_id`; empty when the id is
    /// unknown or the breakpoint is unconditional.
    ///
    /// # Errors
    /// - `DebugError::Store` if the operator was never registered
    pub fn get_condition(&self, operator_id: &str, breakpoint_id: u32) -> Result<String, DebugError> {
        let state = self.get_debug_state(operator_id)?;
        Ok(state
            .find_by_breakpoint_id(breakpoint_id)
            .map(|(_, bp)| bp.condition)
            .unwrap_or_default())
    }

    /// Change a breakpoint's condition. The store is updated immediately,
    /// without waiting for the debugger.
    ///
    /// No-op if the id is unknown or the condition is unchanged.
    ///
    /// # Errors
    /// - `DebugError::Store` if the operator was never registered
    /// - `DebugError::Transport` if a command cannot be sent. Sending stops at
    ///   the first failing worker and the store keeps the old condition, so
    ///   workers earlier in the list may already run with the new one.
    pub fn do_update_breakpoint_condition(
        &self,
        operator_id: &str,
        breakpoint_id: u32,
        condition: &str,
    ) -> Result<(), DebugError> {
        let state = self.get_debug_state(operator_id)?;
        let Some((key, current)) = state.find_by_breakpoint_id(breakpoint_id) else {
            return Ok(());
        };
        if current.condition == condition {
            return Ok(());
        }

        let command = DebugCommand::Condition {
            breakpoint_id,
            expr: condition.to_string(),
        };
        self.broadcast(operator_id, &command)?;

        state.set(
            &key,
            BreakpointState {
                condition: condition.to_string(),
                ..current
            },
        );
        Ok(())
    }

    /// Toggle the breakpoint on `line`: `break` if there is no entry,
    /// `clear` otherwise. Never touches the store; the debugger's
    /// confirmation does.
    ///
    /// # Errors
    /// - `DebugError::Store` if the operator was never registered
    /// - `DebugError::Transport` if a command cannot be sent
    pub fn do_modify_breakpoint(&self, operator_id: &str, line: u32) -> Result<(), DebugError> {
        let state = self.get_debug_state(operator_id)?;
        let command = if state.contains_key(&line_key(line)) {
            DebugCommand::Clear(line)
        } else {
            DebugCommand::Break(line)
        };
        self.broadcast(operator_id, &command)
    }

    /// Resume one worker
    ///
    /// # Errors
    /// - `DebugError::Transport` if the command cannot be sent
    pub fn do_continue(&self, operator_id: &str, worker_id: &str) -> Result<(), DebugError> {
        self.dispatcher
            .dispatch(operator_id, worker_id, &DebugCommand::Continue)?;
        Ok(())
    }

    /// Step one worker to the next line
    ///
    /// # Errors
    /// - `DebugError::Transport` if the command cannot be sent
    pub fn do_step(&self, operator_id: &str, worker_id: &str) -> Result<(), DebugError> {
        self.dispatcher
            .dispatch(operator_id, worker_id, &DebugCommand::Next)?;
        Ok(())
    }

    /// Local bookkeeping for a resume: confirmed breakpoints are un-hit,
    /// entries without a breakpoint id are dropped. Sends nothing.
    ///
    /// # Errors
    /// - `DebugError::Store` if the operator was never registered
    pub fn mark_continue(&self, operator_id: &str) -> Result<(), DebugError> {
        let state = self.get_debug_state(operator_id)?;
        for (key, bp) in state.entries() {
            if bp.breakpoint_id.is_none() {
                state.delete(&key);
            } else if bp.hit {
                state.set(&key, bp.with_hit(false));
            }
        }
        Ok(())
    }

    fn broadcast(&self, operator_id: &str, command: &DebugCommand) -> Result<(), DebugError> {
        let workers = self.workers.worker_ids(operator_id);
        self.dispatcher.dispatch_all(operator_id, &workers, command)?;
        Ok(())
    }

    fn resume_if_idle(&self, operator_id: &str, state: &dyn DebugStateMap) -> Result<(), DebugError> {
        if state.any_hit() {
            return Ok(());
        }
        for worker_id in self.workers.worker_ids(operator_id) {
            self.do_continue(operator_id, &worker_id)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DebugCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugCoordinator")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Apply one classified console line to an operator's store
fn apply_event(state: &dyn DebugStateMap, event: DebugEvent) {
    match event {
        DebugEvent::Created {
            breakpoint_id,
            line,
        } => {
            state.set(&line_key(line), BreakpointState::confirmed(breakpoint_id));
        }
        DebugEvent::Deleted { line, .. } => {
            let key = line_key(line);
            match state.get(&key) {
                Some(bp) if bp.hit => state.set(&key, bp.detached()),
                Some(_) => {
                    state.delete(&key);
                }
                None => {}
            }
        }
        DebugEvent::Paused { line } => {
            let key = line_key(line);
            let paused = state
                .get(&key)
                .map_or_else(|| BreakpointState::default().with_hit(true), |bp| bp.paused());
            state.set(&key, paused);
        }
        DebugEvent::Unrecognized => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportError};
    use crate::workers::MockWorkerRegistry;
    use pretty_assertions::assert_eq;
    use udbg_console::ConsoleMessage;

    const OP: &str = "PythonUDFV2-operator-1";

    fn workers(ids: &'static [&'static str]) -> Arc<MockWorkerRegistry> {
        let mut registry = MockWorkerRegistry::new();
        registry
            .expect_worker_ids()
            .returning(move |_| ids.iter().map(|w| (*w).to_string()).collect());
        Arc::new(registry)
    }

    fn expect_commands(transport: &mut MockTransport, expected: &'static [(&'static str, &'static str)]) {
        let mut seq = mockall::Sequence::new();
        for (worker, cmd) in expected {
            transport
                .expect_send()
                .withf(move |_, payload| payload["workerId"] == *worker && payload["cmd"] == *cmd)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
    }

    fn coordinator(transport: MockTransport, worker_ids: &'static [&'static str]) -> DebugCoordinator {
        let coordinator =
            DebugCoordinator::new(CoordinatorConfig::new(), Arc::new(transport), workers(worker_ids));
        coordinator.register(OP);
        coordinator
    }

    fn batch(title: &str) -> ConsoleUpdateEvent {
        ConsoleUpdateEvent::new(OP, vec![ConsoleMessage::debugger("w1", title)])
    }

    #[test]
    fn modify_broadcasts_to_every_worker() {
        let mut transport = MockTransport::new();
        expect_commands(&mut transport, &[("w1", "break 10"), ("w2", "break 10")]);
        let coordinator = coordinator(transport, &["w1", "w2"]);

        coordinator.do_modify_breakpoint(OP, 10).unwrap();
        assert!(coordinator.get_debug_state(OP).unwrap().is_empty());
    }

    #[test]
    fn condition_update_is_optimistic() {
        let mut transport = MockTransport::new();
        expect_commands(&mut transport, &[("w1", "condition 1 x < 10")]);
        let coordinator = coordinator(transport, &["w1"]);
        let state = coordinator.get_debug_state(OP).unwrap();
        state.set("1", BreakpointState::confirmed(1).with_condition("x > 5"));

        coordinator
            .do_update_breakpoint_condition(OP, 1, "x < 10")
            .unwrap();
        coordinator
            .do_update_breakpoint_condition(OP, 1, "x < 10")
            .unwrap();

        assert_eq!(state.get("1").unwrap().condition, "x < 10");
    }

    #[test]
    fn condition_update_failure_leaves_store_unchanged() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_, _| Err(TransportError::Closed));
        let coordinator = coordinator(transport, &["w1"]);
        let state = coordinator.get_debug_state(OP).unwrap();
        state.set("1", BreakpointState::confirmed(1).with_condition("x > 5"));

        let err = coordinator
            .do_update_breakpoint_condition(OP, 1, "x < 10")
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(state.get("1").unwrap().condition, "x > 5");
    }

    #[test]
    fn condition_update_partial_delivery_keeps_old_condition() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .withf(|_, payload| payload["workerId"] == "w1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        transport
            .expect_send()
            .withf(|_, payload| payload["workerId"] == "w2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(TransportError::Rejected("w2 gone".to_string())));
        let coordinator = coordinator(transport, &["w1", "w2", "w3"]);
        let state = coordinator.get_debug_state(OP).unwrap();
        state.set("1", BreakpointState::confirmed(1).with_condition("x > 5"));

        let err = coordinator
            .do_update_breakpoint_condition(OP, 1, "x < 10")
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(state.get("1").unwrap().condition, "x > 5");
    }

    #[test]
    fn created_event_then_resume_all() {
        let mut transport = MockTransport::new();
        expect_commands(&mut transport, &[("w1", "continue"), ("w2", "continue")]);
        let coordinator = coordinator(transport, &["w1", "w2"]);

        coordinator
            .handle_console_update(&batch("Breakpoint 1 at /path/to/file.py:10"))
            .unwrap();

        assert_eq!(
            coordinator.get_debug_state(OP).unwrap().get("10"),
            Some(BreakpointState::confirmed(1))
        );
    }

    #[test]
    fn hit_entry_suppresses_resume() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();
        let coordinator = coordinator(transport, &["w1"]);

        coordinator
            .handle_console_update(&batch("> /path/to/file.py(10)<module>()"))
            .unwrap();
        coordinator
            .handle_console_update(&batch("*** Blank or comment"))
            .unwrap();

        assert_eq!(
            coordinator.get_debug_state(OP).unwrap().get("10"),
            Some(BreakpointState::default().with_hit(true))
        );
    }

    #[test]
    fn console_for_unregistered_operator_fails() {
        let transport = MockTransport::new();
        let coordinator = coordinator(transport, &["w1"]);
        let err = coordinator
            .handle_console_update(&ConsoleUpdateEvent::new("other", vec![]))
            .unwrap_err();
        assert!(err.is_not_initialized());
    }

    #[test]
    fn mark_continue_resets_hits_and_drops_markers() {
        let transport = MockTransport::new();
        let coordinator = coordinator(transport, &[]);
        let state = coordinator.get_debug_state(OP).unwrap();
        state.set("1", BreakpointState::confirmed(1).with_condition("x > 5").with_hit(true));
        state.set("2", BreakpointState::default().with_hit(true));
        state.set("3", BreakpointState::confirmed(3));

        coordinator.mark_continue(OP).unwrap();

        assert_eq!(
            state.entries(),
            vec![
                ("1".to_string(), BreakpointState::confirmed(1).with_condition("x > 5")),
                ("3".to_string(), BreakpointState::confirmed(3)),
            ]
        );
    }

    #[test]
    fn apply_event_deleted_is_idempotent_on_hit_entries() {
        let state = udbg_store::LocalDebugState::new();
        state.set("10", BreakpointState::confirmed(1).with_hit(true));

        let deleted = DebugEvent::Deleted {
            breakpoint_id: 1,
            line: 10,
        };
        apply_event(&state, deleted);
        apply_event(&state, deleted);

        assert_eq!(state.get("10"), Some(BreakpointState::default().with_hit(true)));
    }

    #[test]
    fn apply_event_paused_preserves_id_and_condition() {
        let state = udbg_store::LocalDebugState::new();
        state.set("4", BreakpointState::confirmed(2).with_condition("n == 3"));

        apply_event(&state, DebugEvent::Paused { line: 4 });

        assert_eq!(
            state.get("4"),
            Some(BreakpointState::confirmed(2).with_condition("n == 3").with_hit(true))
        );
    }

    #[test]
    fn non_udf_operators_are_not_registered() {
        let transport = MockTransport::new();
        let coordinator = DebugCoordinator::new(
            CoordinatorConfig::new(),
            Arc::new(transport),
            workers(&[]),
        )
        .with_operators(&[
            OperatorDescriptor::new("udf", "PythonUDFV2"),
            OperatorDescriptor::new("proj", "Projection"),
        ]);

        assert!(coordinator.get_debug_state("udf").is_ok());
        assert!(coordinator.get_debug_state("proj").unwrap_err().is_not_initialized());
    }
}
