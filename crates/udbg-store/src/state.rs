//! Breakpoint records

use serde::{Deserialize, Serialize};

/// State of a single breakpoint, keyed by source line in a [`DebugStateMap`].
///
/// `breakpoint_id` is assigned by the remote debugger and is absent until a
/// creation has been confirmed (or after a deletion was confirmed while the
/// line was paused). An empty `condition` means unconditional.
///
/// [`DebugStateMap`]: crate::DebugStateMap
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointState {
    /// Debugger-assigned breakpoint number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint_id: Option<u32>,

    /// Condition expression, empty when unconditional
    #[serde(default)]
    pub condition: String,

    /// Whether a worker is currently paused on this line
    #[serde(default)]
    pub hit: bool,
}

impl BreakpointState {
    /// Confirmed, unconditional, not paused
    #[inline]
    #[must_use]
    pub fn confirmed(breakpoint_id: u32) -> Self {
        Self {
            breakpoint_id: Some(breakpoint_id),
            condition: String::new(),
            hit: false,
        }
    }

    /// Set the condition expression
    #[inline]
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Set the hit flag
    #[inline]
    #[must_use]
    pub fn with_hit(mut self, hit: bool) -> Self {
        self.hit = hit;
        self
    }

    /// Copy of this record marked as paused, id and condition preserved
    #[must_use]
    pub fn paused(&self) -> Self {
        Self {
            hit: true,
            ..self.clone()
        }
    }

    /// Copy of this record with the breakpoint id cleared
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            breakpoint_id: None,
            ..self.clone()
        }
    }
}

/// Store key for a source line.
#[inline]
#[must_use]
pub fn line_key(line: u32) -> String {
    line.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_is_unconditional_and_not_hit() {
        let state = BreakpointState::confirmed(3);
        assert_eq!(state.breakpoint_id, Some(3));
        assert_eq!(state.condition, "");
        assert!(!state.hit);
    }

    #[test]
    fn paused_preserves_id_and_condition() {
        let state = BreakpointState::confirmed(1).with_condition("x > 5").paused();
        assert_eq!(state, BreakpointState::confirmed(1).with_condition("x > 5").with_hit(true));
    }

    #[test]
    fn detached_keeps_hit() {
        let state = BreakpointState::confirmed(1).with_hit(true).detached();
        assert_eq!(state.breakpoint_id, None);
        assert!(state.hit);
    }

    #[test]
    fn serializes_with_camel_case_and_omits_missing_id() {
        let json = serde_json::to_value(BreakpointState::default().with_hit(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "condition": "", "hit": true }));

        let parsed: BreakpointState =
            serde_json::from_str(r#"{"breakpointId":4,"condition":"a","hit":false}"#).unwrap();
        assert_eq!(parsed, BreakpointState::confirmed(4).with_condition("a"));
    }

    #[test]
    fn line_keys_are_decimal() {
        assert_eq!(line_key(10), "10");
    }
}
