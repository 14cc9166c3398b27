//! Error types for the debug coordinator

use crate::transport::TransportError;
use udbg_store::StoreError;

/// Main coordinator error type
#[derive(Debug, thiserror::Error)]
pub enum DebugError {
    /// Breakpoint store access failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Outbound command could not be sent
    #[error("dispatch failed: {0}")]
    Transport(#[from] TransportError),

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(String),
}

impl DebugError {
    /// Whether the operator was never registered
    #[inline]
    #[must_use]
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotInitialized(_)))
    }

    /// Whether the failure came from the transport
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
