//! Per-operator breakpoint store registry
//!
//! Provides [`BreakpointStore`], which allocates one [`DebugStateMap`] per
//! registered operator and never destroys it. Resetting a session empties the
//! map in place so handles held by observers stay valid.

use crate::map::{DebugStateHandle, LocalDebugState};
use crate::replica::{ReplicaId, ReplicatedDebugState};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Operator was never registered
    #[error("debug state not initialized for operator {0}")]
    NotInitialized(String),

    /// Operator map is not a replica
    #[error("debug state for operator {0} is not replicated")]
    NotReplicated(String),
}

/// Backend used for newly created maps
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreMode {
    /// Plain ordered map, single observer
    #[default]
    Local,

    /// Convergent replica, multiple observers
    Replicated {
        /// Replica identity; a random one is generated when absent
        #[serde(default)]
        replica_id: Option<String>,
    },
}

#[derive(Debug, Clone)]
enum Slot {
    Local(Arc<LocalDebugState>),
    Replicated(Arc<ReplicatedDebugState>),
}

impl Slot {
    fn handle(&self) -> DebugStateHandle {
        match self {
            Self::Local(map) => Arc::clone(map) as DebugStateHandle,
            Self::Replicated(map) => Arc::clone(map) as DebugStateHandle,
        }
    }
}

/// Registry of breakpoint maps keyed by operator id
#[derive(Debug)]
pub struct BreakpointStore {
    replica: Option<ReplicaId>,
    maps: DashMap<String, Slot>,
}

impl BreakpointStore {
    /// Create an empty store using `mode` for every map it allocates
    #[must_use]
    pub fn new(mode: StoreMode) -> Self {
        let replica = match mode {
            StoreMode::Local => None,
            StoreMode::Replicated { replica_id } => Some(
                replica_id
                    .map(ReplicaId::new)
                    .unwrap_or_else(ReplicaId::random),
            ),
        };

        Self {
            replica,
            maps: DashMap::new(),
        }
    }

    /// Allocate an empty map for `operator_id`.
    ///
    /// Idempotent: an existing map is returned untouched.
    pub fn create(&self, operator_id: &str) -> DebugStateHandle {
        self.maps
            .entry(operator_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(operator_id, "allocating debug state");
                match &self.replica {
                    None => Slot::Local(Arc::new(LocalDebugState::new())),
                    Some(replica) => {
                        Slot::Replicated(Arc::new(ReplicatedDebugState::new(replica.clone())))
                    }
                }
            })
            .handle()
    }

    /// Map for `operator_id`
    ///
    /// # Errors
    /// - `StoreError::NotInitialized` if the operator was never registered
    pub fn get(&self, operator_id: &str) -> Result<DebugStateHandle, StoreError> {
        self.maps
            .get(operator_id)
            .map(|slot| slot.handle())
            .ok_or_else(|| StoreError::NotInitialized(operator_id.to_string()))
    }

    /// Remove every entry from the map for `operator_id`
    ///
    /// # Errors
    /// - `StoreError::NotInitialized` if the operator was never registered
    pub fn clear(&self, operator_id: &str) -> Result<(), StoreError> {
        let map = self.get(operator_id)?;
        map.clear();
        tracing::debug!(operator_id, "cleared debug state");
        Ok(())
    }

    /// Replica backing `operator_id`, for snapshot exchange with peers
    ///
    /// # Errors
    /// - `StoreError::NotInitialized` if the operator was never registered
    /// - `StoreError::NotReplicated` if the store runs in local mode
    pub fn replica(&self, operator_id: &str) -> Result<Arc<ReplicatedDebugState>, StoreError> {
        match self.maps.get(operator_id).as_deref() {
            None => Err(StoreError::NotInitialized(operator_id.to_string())),
            Some(Slot::Local(_)) => Err(StoreError::NotReplicated(operator_id.to_string())),
            Some(Slot::Replicated(map)) => Ok(map.clone()),
        }
    }

    /// Whether `operator_id` has been registered
    #[inline]
    #[must_use]
    pub fn contains(&self, operator_id: &str) -> bool {
        self.maps.contains_key(operator_id)
    }

    /// Registered operator ids, sorted
    #[must_use]
    pub fn operator_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.maps.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Replica identity when running replicated
    #[inline]
    #[must_use]
    pub fn replica_id(&self) -> Option<&ReplicaId> {
        self.replica.as_ref()
    }

    /// Number of registered operators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether no operator is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl Default for BreakpointStore {
    fn default() -> Self {
        Self::new(StoreMode::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BreakpointState;

    #[test]
    fn get_before_create_is_not_initialized() {
        let store = BreakpointStore::default();
        assert_eq!(
            store.get("op").unwrap_err(),
            StoreError::NotInitialized("op".to_string())
        );
        assert!(store.clear("op").is_err());
    }

    #[test]
    fn create_is_idempotent() {
        let store = BreakpointStore::default();
        let first = store.create("op");
        first.set("1", BreakpointState::confirmed(1));

        let second = store.create("op");
        assert_eq!(second.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_empties_in_place() {
        let store = BreakpointStore::default();
        let handle = store.create("op");
        handle.set("1", BreakpointState::confirmed(1));
        handle.set("2", BreakpointState::confirmed(2).with_hit(true));

        store.clear("op").unwrap();
        assert!(handle.is_empty());
        assert!(store.contains("op"));
    }

    #[test]
    fn replicated_mode_exposes_replica() {
        let store = BreakpointStore::new(StoreMode::Replicated {
            replica_id: Some("ui-1".to_string()),
        });
        store.create("op");

        let replica = store.replica("op").unwrap();
        assert_eq!(replica.replica_id().as_str(), "ui-1");
        assert_eq!(store.replica_id().map(ReplicaId::as_str), Some("ui-1"));
    }

    #[test]
    fn local_mode_has_no_replica() {
        let store = BreakpointStore::default();
        store.create("op");
        assert_eq!(
            store.replica("op").unwrap_err(),
            StoreError::NotReplicated("op".to_string())
        );
        assert!(matches!(
            store.replica("other"),
            Err(StoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn operator_ids_are_sorted() {
        let store = BreakpointStore::default();
        store.create("b");
        store.create("a");
        assert_eq!(store.operator_ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
