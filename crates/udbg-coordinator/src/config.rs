//! Coordinator configuration

use crate::dispatcher::DEBUG_COMMAND_MESSAGE_TYPE;
use crate::error::DebugError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use udbg_store::StoreMode;

/// Operator types treated as UDF operators unless configured otherwise
pub const DEFAULT_UDF_OPERATOR_TYPES: [&str; 3] =
    ["PythonUDFV2", "PythonUDFSourceV2", "DualInputPortsPythonUDFV2"];

/// Debug coordinator configuration
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// udf_operator_types = ["PythonUDFV2"]
///
/// [store_mode]
/// kind = "replicated"
/// replica_id = "dashboard-1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Operator type names that get a debug session
    pub udf_operator_types: Vec<String>,
    /// Message type for outbound command requests
    pub command_message_type: String,
    /// Backend for breakpoint maps
    pub store_mode: StoreMode,
}

impl CoordinatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With UDF operator types
    #[must_use]
    pub fn with_udf_operator_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.udf_operator_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// With command message type
    #[inline]
    #[must_use]
    pub fn with_command_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.command_message_type = message_type.into();
        self
    }

    /// With store mode
    #[inline]
    #[must_use]
    pub fn with_store_mode(mut self, mode: StoreMode) -> Self {
        self.store_mode = mode;
        self
    }

    /// Whether `operator_type` is a UDF operator
    #[must_use]
    pub fn is_udf_type(&self, operator_type: &str) -> bool {
        self.udf_operator_types.iter().any(|t| t == operator_type)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// - `DebugError::Config` on malformed TOML or unknown values
    pub fn from_toml_str(text: &str) -> Result<Self, DebugError> {
        toml::from_str(text).map_err(|e| DebugError::Config(e.to_string()))
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `DebugError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DebugError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DebugError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            udf_operator_types: DEFAULT_UDF_OPERATOR_TYPES
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            command_message_type: DEBUG_COMMAND_MESSAGE_TYPE.to_string(),
            store_mode: StoreMode::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = CoordinatorConfig::new();
        assert!(config.is_udf_type("PythonUDFV2"));
        assert!(config.is_udf_type("DualInputPortsPythonUDFV2"));
        assert!(!config.is_udf_type("Projection"));
        assert_eq!(config.command_message_type, "DebugCommandRequest");
        assert_eq!(config.store_mode, StoreMode::Local);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CoordinatorConfig::from_toml_str(
            r#"
            udf_operator_types = ["JavaUDF"]

            [store_mode]
            kind = "replicated"
            replica_id = "dashboard-1"
            "#,
        )
        .unwrap();

        assert_eq!(config.udf_operator_types, vec!["JavaUDF".to_string()]);
        assert_eq!(config.command_message_type, "DebugCommandRequest");
        assert_eq!(
            config.store_mode,
            StoreMode::Replicated {
                replica_id: Some("dashboard-1".to_string())
            }
        );
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = CoordinatorConfig::from_toml_str("udf_operator_types = 3").unwrap_err();
        assert!(matches!(err, DebugError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("udbg.toml");
        std::fs::write(&path, "command_message_type = \"WorkerDebug\"\n").unwrap();

        let config = CoordinatorConfig::load(&path).unwrap();
        assert_eq!(config.command_message_type, "WorkerDebug");

        let missing = CoordinatorConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, DebugError::Config(_)));
    }

    #[test]
    fn builder_methods() {
        let config = CoordinatorConfig::new()
            .with_udf_operator_types(["A", "B"])
            .with_command_message_type("X")
            .with_store_mode(StoreMode::Replicated { replica_id: None });
        assert!(config.is_udf_type("B"));
        assert_eq!(config.command_message_type, "X");
    }
}
