//! Convergent replicated breakpoint map
//!
//! Each key holds a last-writer-wins register ordered by a Lamport stamp
//! `(clock, replica)`. Deletes write a tombstone (`None`) so that a delete
//! seen on one replica beats an older set seen on another. Merging snapshots
//! is commutative and idempotent, so replicas converge whatever order they
//! exchange state in.

use crate::map::DebugStateMap;
use crate::state::BreakpointState;
use crdts::LWWReg;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of one observer's replica
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplicaId(String);

impl ReplicaId {
    /// Named replica
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random replica id
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Id as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lamport stamp; ties on the clock are broken by replica id.
type Stamp = (u64, ReplicaId);

type Register = LWWReg<Option<BreakpointState>, Stamp>;

/// One register as exchanged between replicas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaRecord {
    /// Line key
    pub key: String,
    /// Current value, `None` for a tombstone
    pub value: Option<BreakpointState>,
    /// Lamport clock of the winning write
    pub clock: u64,
    /// Replica that made the winning write
    pub writer: ReplicaId,
}

/// Full state of a replica, suitable for shipping to peers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSnapshot {
    /// Replica that produced the snapshot
    pub origin: ReplicaId,
    /// Highest clock seen by the origin
    pub clock: u64,
    /// Every register, tombstones included
    pub records: Vec<ReplicaRecord>,
}

#[derive(Debug, Default)]
struct Inner {
    clock: u64,
    registers: BTreeMap<String, Register>,
}

impl Inner {
    fn write(&mut self, replica: &ReplicaId, key: &str, value: Option<BreakpointState>) {
        self.clock += 1;
        let stamp = (self.clock, replica.clone());

        match self.registers.entry(key.to_string()) {
            Entry::Occupied(mut slot) => slot.get_mut().update(value, stamp),
            Entry::Vacant(slot) => {
                slot.insert(LWWReg { val: value, marker: stamp });
            }
        }
    }

    fn live(&self, key: &str) -> Option<BreakpointState> {
        self.registers.get(key).and_then(|reg| reg.val.clone())
    }
}

/// Multi-observer breakpoint map
#[derive(Debug)]
pub struct ReplicatedDebugState {
    replica: ReplicaId,
    inner: Mutex<Inner>,
}

impl ReplicatedDebugState {
    /// Create an empty replica
    #[must_use]
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            replica,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Identity of this replica
    #[inline]
    #[must_use]
    pub fn replica_id(&self) -> &ReplicaId {
        &self.replica
    }

    /// Export every register
    #[must_use]
    pub fn snapshot(&self) -> ReplicaSnapshot {
        let inner = self.inner.lock();
        let records = inner
            .registers
            .iter()
            .map(|(key, reg)| ReplicaRecord {
                key: key.clone(),
                value: reg.val.clone(),
                clock: reg.marker.0,
                writer: reg.marker.1.clone(),
            })
            .collect();

        ReplicaSnapshot {
            origin: self.replica.clone(),
            clock: inner.clock,
            records,
        }
    }

    /// Fold a peer snapshot into this replica
    pub fn merge(&self, snapshot: &ReplicaSnapshot) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.clock = inner.clock.max(snapshot.clock);

        for record in &snapshot.records {
            let stamp = (record.clock, record.writer.clone());
            match inner.registers.entry(record.key.clone()) {
                Entry::Occupied(mut slot) => slot.get_mut().update(record.value.clone(), stamp),
                Entry::Vacant(slot) => {
                    slot.insert(LWWReg {
                        val: record.value.clone(),
                        marker: stamp,
                    });
                }
            }
        }

        tracing::debug!(
            replica = %self.replica,
            origin = %snapshot.origin,
            records = snapshot.records.len(),
            "merged replica snapshot"
        );
    }

    /// Number of registers including tombstones
    #[must_use]
    pub fn register_count(&self) -> usize {
        self.inner.lock().registers.len()
    }

    fn write(&self, key: &str, value: Option<BreakpointState>) {
        self.inner.lock().write(&self.replica, key, value);
    }
}

impl DebugStateMap for ReplicatedDebugState {
    fn get(&self, key: &str) -> Option<BreakpointState> {
        self.inner.lock().live(key)
    }

    fn set(&self, key: &str, state: BreakpointState) {
        self.write(key, Some(state));
    }

    fn delete(&self, key: &str) -> Option<BreakpointState> {
        let mut inner = self.inner.lock();
        let previous = inner.live(key);
        if previous.is_some() {
            inner.write(&self.replica, key, None);
        }
        previous
    }

    fn entries(&self) -> Vec<(String, BreakpointState)> {
        self.inner
            .lock()
            .registers
            .iter()
            .filter_map(|(key, reg)| reg.val.clone().map(|state| (key.clone(), state)))
            .collect()
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .registers
            .values()
            .filter(|reg| reg.val.is_some())
            .count()
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        let live: Vec<String> = inner
            .registers
            .iter()
            .filter(|(_, reg)| reg.val.is_some())
            .map(|(key, _)| key.clone())
            .collect();
        for key in live {
            inner.write(&self.replica, &key, None);
        }
    }
}
