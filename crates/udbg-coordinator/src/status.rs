//! Execution-status and operator-lifecycle notifications

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Operator execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperatorState {
    /// Not yet started, or reset after a run
    #[default]
    Uninitialized,
    /// Workers being created
    Initializing,
    /// Ready to run
    Ready,
    /// Processing
    Running,
    /// Pause requested
    Pausing,
    /// Paused
    Paused,
    /// Resume requested
    Resuming,
    /// Finished
    Completed,
    /// Recovering after failure
    Recovering,
}

impl OperatorState {
    /// Whether this state resets debug sessions
    #[inline]
    #[must_use]
    pub fn is_reset(self) -> bool {
        matches!(self, Self::Uninitialized)
    }
}

/// Per-operator statistics carried on the status stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorStatistics {
    /// Current state
    pub operator_state: OperatorState,
    /// Rows consumed so far
    #[serde(default)]
    pub aggregated_input_row_count: u64,
    /// Rows produced so far
    #[serde(default)]
    pub aggregated_output_row_count: u64,
}

impl OperatorStatistics {
    /// Statistics with zero counts
    #[inline]
    #[must_use]
    pub fn in_state(operator_state: OperatorState) -> Self {
        Self {
            operator_state,
            ..Self::default()
        }
    }
}

/// One status update: operator id to statistics
pub type ExecutionStatusUpdate = HashMap<String, OperatorStatistics>;

/// Operator known to the workflow, as announced on the lifecycle stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDescriptor {
    /// Operator id
    pub operator_id: String,
    /// Operator type name
    pub operator_type: String,
}

impl OperatorDescriptor {
    /// Create a descriptor
    #[inline]
    #[must_use]
    pub fn new(operator_id: impl Into<String>, operator_type: impl Into<String>) -> Self {
        Self {
            operator_id: operator_id.into(),
            operator_type: operator_type.into(),
        }
    }
}
