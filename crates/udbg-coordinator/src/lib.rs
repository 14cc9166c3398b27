//! UDBG Coordinator
//!
//! Interactive debugging for UDF operators running on distributed workers.
//! The coordinator owns one breakpoint map per operator, turns user actions
//! into debugger commands and folds debugger console output back into the
//! maps.
//!
//! # Core Concepts
//!
//! - [`DebugCoordinator`]: Breakpoint lifecycle and resume rule
//! - [`CommandDispatcher`]: Typed commands to per-worker requests
//! - [`Transport`]: Outbound message seam
//! - [`WorkerRegistry`]: Worker enumeration per operator
//! - [`CoordinatorConfig`]: UDF operator types, message type, store backend
//! - [`replay`]: Offline replay of recorded console batches
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use udbg_coordinator::prelude::*;
//!
//! let (transport, mut outbound) = ChannelTransport::channel();
//! let workers = Arc::new(WorkerTable::new());
//! workers.set_workers("udf-1", ["worker-0"]);
//!
//! let coordinator = DebugCoordinator::new(CoordinatorConfig::new(), Arc::new(transport), workers);
//! coordinator.register("udf-1");
//! coordinator.do_modify_breakpoint("udf-1", 12).unwrap();
//!
//! let sent = outbound.try_recv().unwrap();
//! assert_eq!(sent.payload["cmd"], "break 12");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod command;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod reactor;
pub mod replay;
pub mod status;
pub mod transport;
pub mod workers;

// Re-exports
pub use command::{CommandParseError, DebugCommand, DebugCommandRequest};
pub use config::{CoordinatorConfig, DEFAULT_UDF_OPERATOR_TYPES};
pub use coordinator::DebugCoordinator;
pub use dispatcher::{CommandDispatcher, DEBUG_COMMAND_MESSAGE_TYPE};
pub use error::DebugError;
pub use reactor::ReactorSummary;
pub use replay::{ReplayError, ReplayOutput, ReplayTarget};
pub use status::{ExecutionStatusUpdate, OperatorDescriptor, OperatorState, OperatorStatistics};
pub use transport::{ChannelTransport, OutboundMessage, Transport, TransportError};
pub use workers::{WorkerRegistry, WorkerTable};

/// Common imports for embedding the coordinator
pub mod prelude {
    pub use crate::command::DebugCommand;
    pub use crate::config::CoordinatorConfig;
    pub use crate::coordinator::DebugCoordinator;
    pub use crate::error::DebugError;
    pub use crate::status::{ExecutionStatusUpdate, OperatorDescriptor, OperatorState};
    pub use crate::transport::{ChannelTransport, Transport};
    pub use crate::workers::{WorkerRegistry, WorkerTable};
    pub use udbg_console::{ConsoleMessage, ConsoleUpdateEvent, DebugEvent};
    pub use udbg_store::{BreakpointState, DebugStateMap};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
