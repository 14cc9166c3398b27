//! Debugger output classification
//!
//! Maps one console title to a [`DebugEvent`]. The patterns follow the
//! interactive debugger's own phrasing:
//!
//! - `Deleted breakpoint <id> at <path>:<line>`
//! - `Breakpoint <id> at <path>:<line>`
//! - `> <path>(<line>)<frame>` (current stack frame after a stop)
//!
//! Deletion is matched first because its text also contains "breakpoint".

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DELETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Deleted breakpoint (\d+) at (.+):(\d+)$").expect("valid deleted pattern")
});

static CREATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Breakpoint (\d+) at (.+):(\d+)$").expect("valid created pattern"));

static PAUSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^> (.+)\((\d+)\)").expect("valid paused pattern"));

/// Meaning of one debugger console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DebugEvent {
    /// Breakpoint was set
    Created {
        /// Debugger-assigned id
        breakpoint_id: u32,
        /// Source line
        line: u32,
    },

    /// Breakpoint was removed
    Deleted {
        /// Debugger-assigned id
        breakpoint_id: u32,
        /// Source line
        line: u32,
    },

    /// Worker stopped at a line
    Paused {
        /// Source line
        line: u32,
    },

    /// Anything else
    Unrecognized,
}

impl DebugEvent {
    /// Source line the event refers to, if any
    #[inline]
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Created { line, .. } | Self::Deleted { line, .. } | Self::Paused { line } => {
                Some(*line)
            }
            Self::Unrecognized => None,
        }
    }
}

/// Classify a console title. Never fails; unknown text is
/// [`DebugEvent::Unrecognized`].
#[must_use]
pub fn classify(title: &str) -> DebugEvent {
    let title = title.trim_end();

    if let Some(caps) = DELETED.captures(title) {
        if let (Some(breakpoint_id), Some(line)) = (number(&caps, 1), number(&caps, 3)) {
            return DebugEvent::Deleted {
                breakpoint_id,
                line,
            };
        }
        return DebugEvent::Unrecognized;
    }

    if let Some(caps) = CREATED.captures(title) {
        if let (Some(breakpoint_id), Some(line)) = (number(&caps, 1), number(&caps, 3)) {
            return DebugEvent::Created {
                breakpoint_id,
                line,
            };
        }
        return DebugEvent::Unrecognized;
    }

    if let Some(line) = PAUSED.captures(title).and_then(|caps| number(&caps, 2)) {
        return DebugEvent::Paused { line };
    }

    DebugEvent::Unrecognized
}

fn number(caps: &regex::Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}
