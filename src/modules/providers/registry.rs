//! Static provider registry
//!
//! Provider names are resolved against a fixed map of factories built at
//! startup, in place of any runtime code loading. Hosts can extend a
//! registry of their own with additional backends.

use crate::mongodb::MongoProvider;
use crate::traits::DbProvider;
use dblayer_core::{DbLayerError, Result};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory producing a provider instance from its validated-by-itself
/// configuration. Construction is synchronous; no I/O happens until `init`.
pub type ProviderFactory = Arc<dyn Fn(&Value) -> Result<Arc<dyn DbProvider>> + Send + Sync>;

/// Registry mapping provider names to factories
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in providers
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("mongodb", |configuration| {
            Ok(Arc::new(MongoProvider::new(configuration)?) as Arc<dyn DbProvider>)
        });
        registry
    }

    /// Register a factory under the given name (lowercased)
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Value) -> Result<Arc<dyn DbProvider>> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.trim().to_lowercase(), Arc::new(factory));
    }

    /// Names of all registered providers, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a provider name to its factory
    pub fn resolve(&self, name: &str) -> Result<ProviderFactory> {
        self.factories
            .get(&name.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| DbLayerError::ProviderNotSupported {
                provider: name.to_string(),
                reason: format!(
                    "no registered factory (known providers: {})",
                    self.names().join(", ")
                ),
            })
    }

    /// Resolve and instantiate a provider with the given configuration.
    ///
    /// Resolution failure and instantiation failure are distinct errors;
    /// the latter wraps the factory's own message.
    pub fn instantiate(&self, name: &str, configuration: &Value) -> Result<Arc<dyn DbProvider>> {
        let factory = self.resolve(name)?;
        factory(configuration).map_err(|e| DbLayerError::ProviderInitialization {
            provider: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

static BUILTIN: Lazy<ProviderRegistry> = Lazy::new(ProviderRegistry::builtin);

/// The shared registry of built-in providers
pub fn builtin_registry() -> &'static ProviderRegistry {
    &BUILTIN
}
