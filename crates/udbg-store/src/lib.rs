//! UDBG Breakpoint Store
//!
//! Per-operator breakpoint state shared between the debug coordinator and
//! every other observer of a debugging session.
//!
//! # Core Concepts
//!
//! - [`BreakpointState`]: One record per source line
//! - [`DebugStateMap`]: Whole-record key/value interface the coordinator works against
//! - [`LocalDebugState`]: Ordered in-memory map for single-observer sessions
//! - [`ReplicatedDebugState`]: Last-writer-wins replica for multi-observer sessions
//! - [`BreakpointStore`]: Registry holding one map per operator
//!
//! # Example
//!
//! ```rust
//! use udbg_store::{BreakpointState, BreakpointStore, StoreMode};
//!
//! let store = BreakpointStore::new(StoreMode::Local);
//! let state = store.create("PythonUDF-1");
//! state.set("10", BreakpointState::confirmed(1));
//!
//! assert_eq!(store.get("PythonUDF-1").unwrap().len(), 1);
//! assert!(store.get("Projection-2").is_err());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod map;
mod replica;
mod state;
mod store;

// Re-exports
pub use map::{DebugStateHandle, DebugStateMap, LocalDebugState};
pub use replica::{ReplicaId, ReplicaRecord, ReplicaSnapshot, ReplicatedDebugState};
pub use state::{line_key, BreakpointState};
pub use store::{BreakpointStore, StoreError, StoreMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
