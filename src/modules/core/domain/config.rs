//! Adapter configuration

use crate::error::{DbLayerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_name() -> String {
    "dblayer".to_string()
}

/// Construction-time configuration for the adapter facade
///
/// `provider` selects the backend; `configuration` is opaque here and only
/// validated by the provider it is handed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Instance name, used to attribute completion events to this adapter
    #[serde(default = "default_name")]
    pub name: String,

    /// Name of the backend provider
    pub provider: String,

    /// Provider-specific configuration
    pub configuration: Value,
}

impl AdapterConfig {
    /// Create a new adapter configuration
    pub fn new(provider: impl Into<String>, configuration: Value) -> Self {
        Self {
            name: default_name(),
            provider: provider.into(),
            configuration,
        }
    }

    /// Set the instance name used for event attribution
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Decode an adapter configuration from loose host JSON, reporting the
    /// first missing or mistyped field by name.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            DbLayerError::Configuration("missing/incorrect configuration object".into())
        })?;

        let provider = root.get("provider").and_then(Value::as_str).ok_or_else(|| {
            DbLayerError::Configuration(
                "missing/incorrect 'provider' string property in config properties".into(),
            )
        })?;

        let configuration = root.get("configuration").ok_or_else(|| {
            DbLayerError::Configuration(
                "missing/incorrect 'configuration' object property in config properties".into(),
            )
        })?;
        if !configuration.is_object() {
            return Err(DbLayerError::Configuration(
                "missing/incorrect 'configuration' object property in config properties".into(),
            ));
        }

        let name = root
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(default_name);

        Ok(Self {
            name,
            provider: provider.to_string(),
            configuration: configuration.clone(),
        })
    }

    /// Structural check on an already-typed configuration: provider must be
    /// a non-empty string and configuration a JSON object.
    pub fn check(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(DbLayerError::Configuration(
                "missing/incorrect 'provider' string property in config properties".into(),
            ));
        }
        if !self.configuration.is_object() {
            return Err(DbLayerError::Configuration(
                "missing/incorrect 'configuration' object property in config properties".into(),
            ));
        }
        Ok(())
    }
}
