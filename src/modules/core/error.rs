//! Error types for dblayer

use thiserror::Error;

/// Main error type for dblayer operations
#[derive(Error, Debug)]
pub enum DbLayerError {
    /// Malformed adapter or provider configuration; fatal at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Named provider has no registered implementation; fatal at construction
    #[error("provider '{provider}' is not supported: {reason}")]
    ProviderNotSupported { provider: String, reason: String },

    /// Resolved provider's constructor failed; fatal at construction
    #[error("loading provider '{provider}' failed with: {reason}")]
    ProviderInitialization { provider: String, reason: String },

    /// The underlying connect call failed during init
    #[error("Connection error: {0}")]
    Connection(String),

    /// A work item failed structural or semantic checks
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collection resolution or action invocation failed at the driver level
    #[error("Operation error: {0}")]
    Operation(String),

    /// A lazy result sequence failed to materialize after the action
    /// itself already succeeded
    #[error("Result drain error: {0}")]
    ResultDrain(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbLayerError {
    /// Returns true if this error is fatal to adapter construction
    /// (no adapter instance is produced)
    pub fn is_construction_failure(&self) -> bool {
        matches!(
            self,
            DbLayerError::Configuration(_)
                | DbLayerError::ProviderNotSupported { .. }
                | DbLayerError::ProviderInitialization { .. }
        )
    }

    /// Returns true if this error is scoped to a single work item and
    /// leaves the provider's connection state untouched
    pub fn is_work_item_error(&self) -> bool {
        matches!(
            self,
            DbLayerError::Validation(_)
                | DbLayerError::Operation(_)
                | DbLayerError::ResultDrain(_)
        )
    }
}

/// Result type alias using DbLayerError
pub type Result<T> = std::result::Result<T, DbLayerError>;
