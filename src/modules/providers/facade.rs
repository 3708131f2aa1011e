//! Adapter facade
//!
//! The facade is what the host pipeline holds: it resolves the configured
//! provider at construction, then republishes the provider's
//! init/validate/process operations as its own, adding a work-item nature
//! check in front of validate under the strict policy.

use crate::registry::{builtin_registry, ProviderRegistry};
use crate::report::EventSink;
use crate::traits::{DbProvider, QueryOutcome};
use dblayer_core::{AdapterConfig, DbLayerError, Result, WorkItem};
use dblayer_types::nature;
use std::sync::Arc;
use tracing::info;

/// How the facade validates work items before delegating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Run the host pre-check and the nature type/quality check, then
    /// delegate to the provider
    #[default]
    Strict,

    /// Delegate to the provider directly (historical behavior)
    Legacy,
}

/// Host-supplied generic validation step, run first under the strict policy
pub type Precheck = Arc<dyn Fn(&WorkItem) -> Result<()> + Send + Sync>;

/// Database-layer adapter facade holding exactly one provider instance
pub struct DbLayer {
    name: String,
    provider_name: String,
    instance: Arc<dyn DbProvider>,
    policy: ValidationPolicy,
    precheck: Option<Precheck>,
}

impl DbLayer {
    /// Build an adapter from its configuration, resolving the provider
    /// against the built-in registry.
    pub fn new(config: AdapterConfig) -> Result<Self> {
        Self::with_registry(config, builtin_registry())
    }

    /// Build an adapter resolving the provider against a caller-supplied
    /// registry.
    pub fn with_registry(config: AdapterConfig, registry: &ProviderRegistry) -> Result<Self> {
        config.check()?;
        let instance = registry.instantiate(&config.provider, &config.configuration)?;
        info!(
            adapter = %config.name,
            provider = %config.provider,
            "provider instantiated"
        );
        Ok(Self {
            name: config.name,
            provider_name: config.provider,
            instance,
            policy: ValidationPolicy::default(),
            precheck: None,
        })
    }

    /// Select the validation policy
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Install the host's generic validation step
    pub fn with_precheck(mut self, precheck: Precheck) -> Self {
        self.precheck = Some(precheck);
        self
    }

    /// Instance name used for event attribution
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the configured provider
    pub fn provider(&self) -> &str {
        &self.provider_name
    }

    /// Initialize the underlying provider (delegates directly)
    pub async fn init(&self) -> Result<()> {
        info!(adapter = %self.name, "initializing adapter");
        self.instance.init().await?;
        info!(adapter = %self.name, "adapter initialized successfully");
        Ok(())
    }

    /// Validate a work item according to the configured policy
    pub async fn validate(&self, item: &WorkItem) -> Result<()> {
        if self.policy == ValidationPolicy::Strict {
            if let Some(precheck) = &self.precheck {
                precheck(item)?;
            }
            if !item.nature.is_database() {
                return Err(DbLayerError::Validation(format!(
                    "type '{}' not supported, expected '{}'",
                    item.nature.kind,
                    nature::TYPE_DATABASE
                )));
            }
            if !item.nature.is_query() {
                return Err(DbLayerError::Validation(format!(
                    "quality '{}' not supported, expected '{}'",
                    item.nature.quality,
                    nature::QUALITY_QUERY
                )));
            }
        }
        self.instance.validate(item).await
    }

    /// Process a work item (delegates directly); canonical promise-style
    /// completion.
    pub async fn process(&self, item: &WorkItem) -> Result<QueryOutcome> {
        self.instance.process(item).await
    }

    /// Process a work item, reporting completion on the event channel
    /// instead of the return value (legacy pipeline protocol).
    pub async fn process_emit(&self, item: &WorkItem, events: &EventSink) {
        let result = self.process(item).await;
        events.report(&self.name, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Completion;
    use async_trait::async_trait;
    use bson::Bson;
    use dblayer_core::QueryPayload;
    use dblayer_types::{Nature, ProviderKind};
    use serde_json::json;

    /// In-memory provider standing in for a real backend
    struct FakeProvider {
        fail_process: bool,
    }

    #[async_trait]
    impl DbProvider for FakeProvider {
        async fn init(&self) -> Result<()> {
            Ok(())
        }

        async fn validate(&self, item: &WorkItem) -> Result<()> {
            if item.payload.collection.is_empty() {
                return Err(DbLayerError::Validation(
                    "missing/incorrect 'collection' String property in job payload".into(),
                ));
            }
            Ok(())
        }

        async fn process(&self, _item: &WorkItem) -> Result<QueryOutcome> {
            if self.fail_process {
                Err(DbLayerError::Operation("action invocation failed".into()))
            } else {
                Ok(QueryOutcome::Single(Bson::Document(
                    bson::doc! { "insertedCount": 1_i64 },
                )))
            }
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Mongodb
        }
    }

    fn fake_registry(fail_process: bool) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register("fake", move |_configuration| {
            Ok(Arc::new(FakeProvider { fail_process }) as Arc<dyn DbProvider>)
        });
        registry
    }

    fn adapter(fail_process: bool) -> DbLayer {
        let config = AdapterConfig::new("fake", json!({})).with_name("dblayer-fake");
        DbLayer::with_registry(config, &fake_registry(fail_process)).unwrap()
    }

    fn query_item() -> WorkItem {
        WorkItem::query(QueryPayload::new(
            "test",
            "insertMany",
            vec![json!([{ "name": "foo" }])],
        ))
    }

    #[test]
    fn test_construction_rejects_unknown_provider() {
        let config = AdapterConfig::new("unknownprovider", json!({}));
        let err = DbLayer::with_registry(config, &fake_registry(false)).err().unwrap();
        assert!(matches!(err, DbLayerError::ProviderNotSupported { .. }));
        assert!(err.to_string().contains("unknownprovider"));
    }

    #[test]
    fn test_construction_rejects_bad_config_shape() {
        let config = AdapterConfig::new("", json!({}));
        assert!(DbLayer::with_registry(config, &fake_registry(false)).is_err());

        let config = AdapterConfig::new("fake", json!("not an object"));
        assert!(DbLayer::with_registry(config, &fake_registry(false)).is_err());
    }

    #[tokio::test]
    async fn test_strict_validate_rejects_wrong_type() {
        let adapter = adapter(false);
        let mut item = query_item();
        item.nature = Nature::new("messaging", "query");

        let err = adapter.validate(&item).await.unwrap_err();
        assert!(err.to_string().contains("'messaging'"));
    }

    #[tokio::test]
    async fn test_strict_validate_rejects_wrong_quality() {
        let adapter = adapter(false);
        let mut item = query_item();
        item.nature = Nature::new("database", "execution");

        let err = adapter.validate(&item).await.unwrap_err();
        assert!(err.to_string().contains("'execution'"));
    }

    #[tokio::test]
    async fn test_strict_validate_accepts_padded_case_insensitive_type() {
        let adapter = adapter(false);
        let mut item = query_item();
        item.nature = Nature::new(" Database ", "QUERY");
        assert!(adapter.validate(&item).await.is_ok());
    }

    #[tokio::test]
    async fn test_legacy_validate_skips_nature_check() {
        let adapter = adapter(false).with_policy(ValidationPolicy::Legacy);
        let mut item = query_item();
        item.nature = Nature::new("messaging", "publish");
        // legacy policy delegates straight to the provider, which only
        // inspects the payload
        assert!(adapter.validate(&item).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_is_idempotent() {
        let adapter = adapter(false);
        let item = query_item();
        assert!(adapter.validate(&item).await.is_ok());
        assert!(adapter.validate(&item).await.is_ok());
    }

    #[tokio::test]
    async fn test_precheck_runs_before_nature_check() {
        let adapter = adapter(false).with_precheck(Arc::new(|_item: &WorkItem| {
            Err(DbLayerError::Validation("host rejected the work item".into()))
        }));
        let err = adapter.validate(&query_item()).await.unwrap_err();
        assert!(err.to_string().contains("host rejected"));
    }

    #[tokio::test]
    async fn test_process_delegates_and_resolves() {
        let adapter = adapter(false);
        let outcome = adapter.process(&query_item()).await.unwrap();
        assert_eq!(outcome.to_json()["insertedCount"], json!(1));
    }

    #[tokio::test]
    async fn test_process_emit_done_event() {
        let adapter = adapter(false);
        let (sink, mut rx) = EventSink::channel();
        adapter.process_emit(&query_item(), &sink).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.source(), "dblayer-fake");
        assert!(event.is_done());
    }

    #[tokio::test]
    async fn test_process_emit_error_event() {
        let adapter = adapter(true);
        let (sink, mut rx) = EventSink::channel();
        adapter.process_emit(&query_item(), &sink).await;

        match rx.recv().await.unwrap() {
            Completion::Error { source, error } => {
                assert_eq!(source, "dblayer-fake");
                assert!(error.to_string().contains("action invocation failed"));
            }
            other => panic!("expected error event, got {:?}", other.is_done()),
        }
    }
}
