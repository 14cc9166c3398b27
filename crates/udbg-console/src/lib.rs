//! UDBG Console
//!
//! Inbound console traffic from the interactive debugger embedded in each
//! UDF worker, and the classifier that turns its text lines into events.
//!
//! # Overview
//!
//! - [`ConsoleUpdateEvent`]: One relayed batch of console lines for an operator
//! - [`DebugEvent`]: What a single line means for breakpoint state
//! - [`classify`]: Pure, total title classifier
//!
//! # Example
//!
//! ```rust
//! use udbg_console::{classify, DebugEvent};
//!
//! assert_eq!(
//!     classify("Breakpoint 1 at /path/to/file.py:10"),
//!     DebugEvent::Created { breakpoint_id: 1, line: 10 }
//! );
//! assert_eq!(classify("*** Blank or comment"), DebugEvent::Unrecognized);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod event;
mod message;

pub use event::{classify, DebugEvent};
pub use message::{ConsoleMessage, ConsoleMessageType, ConsoleTimestamp, ConsoleUpdateEvent};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
