//! Whole-record breakpoint map interface
//!
//! Writers replace an entire [`BreakpointState`] per key; no partial field
//! update is ever visible to another observer.

use crate::state::BreakpointState;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to one operator's breakpoint map
pub type DebugStateHandle = Arc<dyn DebugStateMap>;

/// Key/value view over one operator's breakpoints, keyed by source line.
///
/// Implementations must be safe to share between observers. Convergence
/// between concurrent writers relies on whole-record overwrite per key.
pub trait DebugStateMap: fmt::Debug + Send + Sync {
    /// Record stored under `key`
    fn get(&self, key: &str) -> Option<BreakpointState>;

    /// Replace the record stored under `key`
    fn set(&self, key: &str, state: BreakpointState);

    /// Remove `key`, returning the previous record
    fn delete(&self, key: &str) -> Option<BreakpointState>;

    /// Snapshot of all live entries, ordered by key
    fn entries(&self) -> Vec<(String, BreakpointState)>;

    /// Number of live entries
    fn len(&self) -> usize;

    /// Remove every entry
    fn clear(&self);

    /// Whether there are no live entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` has a live entry
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// First entry carrying `breakpoint_id`
    fn find_by_breakpoint_id(&self, breakpoint_id: u32) -> Option<(String, BreakpointState)> {
        self.entries()
            .into_iter()
            .find(|(_, state)| state.breakpoint_id == Some(breakpoint_id))
    }

    /// Whether any entry is currently hit
    fn any_hit(&self) -> bool {
        self.entries().iter().any(|(_, state)| state.hit)
    }
}

/// Ordered in-memory map for a single observer
#[derive(Debug, Default)]
pub struct LocalDebugState {
    entries: RwLock<BTreeMap<String, BreakpointState>>,
}

impl LocalDebugState {
    /// Create an empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DebugStateMap for LocalDebugState {
    fn get(&self, key: &str) -> Option<BreakpointState> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, state: BreakpointState) {
        self.entries.write().insert(key.to_string(), state);
    }

    fn delete(&self, key: &str) -> Option<BreakpointState> {
        self.entries.write().remove(key)
    }

    fn entries(&self) -> Vec<(String, BreakpointState)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}
