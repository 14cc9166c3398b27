//! Console batch wire format

use crate::event::{classify, DebugEvent};
use serde::{Deserialize, Serialize};

/// Emission time of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsoleTimestamp {
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub seconds: i64,
    /// Sub-second nanoseconds
    #[serde(default)]
    pub nanos: i32,
}

/// Console line category as reported by the worker
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsoleMessageType {
    /// Category name, e.g. `DEBUGGER`, `PRINT`, `ERROR`
    pub name: String,
}

/// One console line from one worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleMessage {
    /// Emitting worker
    pub worker_id: String,
    /// Emission time
    #[serde(default)]
    pub timestamp: ConsoleTimestamp,
    /// First line of output; the only field used for classification
    pub title: String,
    /// Remaining output
    #[serde(default)]
    pub message: String,
    /// Producer tag, e.g. `(Pdb)`
    #[serde(default)]
    pub source: String,
    /// Line category
    #[serde(default)]
    pub msg_type: ConsoleMessageType,
}

impl ConsoleMessage {
    /// Debugger line with the given title
    #[must_use]
    pub fn debugger(worker_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            timestamp: ConsoleTimestamp::default(),
            title: title.into(),
            message: String::new(),
            source: "(Pdb)".to_string(),
            msg_type: ConsoleMessageType {
                name: "DEBUGGER".to_string(),
            },
        }
    }

    /// Classify this line's title
    #[inline]
    #[must_use]
    pub fn event(&self) -> DebugEvent {
        classify(&self.title)
    }
}

/// Batch of console lines relayed for one operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleUpdateEvent {
    /// Operator whose workers produced the lines
    pub operator_id: String,
    /// Lines in emission order
    #[serde(default)]
    pub messages: Vec<ConsoleMessage>,
}

impl ConsoleUpdateEvent {
    /// Create a batch
    #[inline]
    #[must_use]
    pub fn new(operator_id: impl Into<String>, messages: Vec<ConsoleMessage>) -> Self {
        Self {
            operator_id: operator_id.into(),
            messages,
        }
    }
}
