//! MongoDB provider implementation

use super::actions;
use super::config::MongoConfig;
use crate::traits::{DbProvider, QueryOutcome};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use dblayer_core::{DbLayerError, Result, WorkItem};
use dblayer_types::ProviderKind;
use mongodb::options::{
    Acknowledgment, ClientOptions, CollectionOptions, ReadConcern, WriteConcern,
};
use mongodb::{Client, Database};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, trace};

/// MongoDB backend provider
///
/// Owns exactly one connection handle, established by `init` and shared by
/// all subsequent `process` calls. There is no reconnect logic: a failed
/// `init` leaves the provider uninitialized and only another `init` call
/// can make it ready.
pub struct MongoProvider {
    config: MongoConfig,
    db: RwLock<Option<Database>>,
}

impl MongoProvider {
    /// Validate the raw configuration and build an uninitialized provider.
    /// No I/O happens here.
    pub fn new(configuration: &Value) -> Result<Self> {
        let config = MongoConfig::from_value(configuration)?;
        Ok(Self {
            config,
            db: RwLock::new(None),
        })
    }

    /// The canonical connection string this provider will connect with
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Apply the recognized configuration options onto parsed client options
    fn apply_client_options(&self, options: &mut ClientOptions) -> Result<()> {
        let config = &self.config.options;
        if let Some(value) = config.get("appName") {
            options.app_name = Some(string_option(value, "appName")?);
        }
        if let Some(value) = config.get("minPoolSize") {
            options.min_pool_size = Some(u32_option(value, "minPoolSize")?);
        }
        if let Some(value) = config.get("maxPoolSize") {
            options.max_pool_size = Some(u32_option(value, "maxPoolSize")?);
        }
        if let Some(value) = config.get("connectTimeoutMS") {
            options.connect_timeout =
                Some(Duration::from_millis(u64::from(u32_option(value, "connectTimeoutMS")?)));
        }
        if let Some(value) = config.get("serverSelectionTimeoutMS") {
            options.server_selection_timeout = Some(Duration::from_millis(u64::from(u32_option(
                value,
                "serverSelectionTimeoutMS",
            )?)));
        }
        Ok(())
    }

    /// Translate the configured collection-open options. Failures here are
    /// collection-resolution failures, surfaced before any action runs.
    fn collection_options(&self) -> Result<Option<CollectionOptions>> {
        let config = &self.config.collection_options;
        if config.is_empty() {
            return Ok(None);
        }

        let mut options = CollectionOptions::default();
        if let Some(value) = config.get("readConcern") {
            let level = value
                .as_document()
                .and_then(|d| d.get("level"))
                .and_then(Bson::as_str)
                .ok_or_else(|| {
                    DbLayerError::Operation(
                        "incorrect 'readConcern' collection option: expected { level: String }"
                            .into(),
                    )
                })?;
            options.read_concern = Some(ReadConcern::custom(level.to_string()));
        }
        if let Some(value) = config.get("writeConcern") {
            let w = value
                .as_document()
                .and_then(|d| d.get("w"))
                .ok_or_else(|| {
                    DbLayerError::Operation(
                        "incorrect 'writeConcern' collection option: expected { w: ... }".into(),
                    )
                })?;
            let acknowledgment = match w {
                Bson::Int32(n) if *n >= 0 => Acknowledgment::Nodes(*n as u32),
                Bson::Int64(n) if *n >= 0 => Acknowledgment::Nodes(*n as u32),
                Bson::String(s) if s == "majority" => Acknowledgment::Majority,
                Bson::String(s) => Acknowledgment::Custom(s.clone()),
                _ => {
                    return Err(DbLayerError::Operation(
                        "incorrect 'writeConcern.w' collection option: expected number or string"
                            .into(),
                    ))
                }
            };
            options.write_concern = Some(WriteConcern::builder().w(acknowledgment).build());
        }
        Ok(Some(options))
    }
}

#[async_trait]
impl DbProvider for MongoProvider {
    async fn init(&self) -> Result<()> {
        info!(
            url = %self.config.url,
            "Connecting to MongoDB using native driver..."
        );

        let mut options = ClientOptions::parse(&self.config.url)
            .await
            .map_err(|e| DbLayerError::Connection(e.to_string()))?;
        self.apply_client_options(&mut options)?;

        let client =
            Client::with_options(options).map_err(|e| DbLayerError::Connection(e.to_string()))?;
        let db = client.default_database().ok_or_else(|| {
            DbLayerError::Connection(
                "no database specified in connection string".into(),
            )
        })?;

        // The driver connects lazily; a ping proves the topology is
        // actually reachable before the provider reports ready.
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| DbLayerError::Connection(e.to_string()))?;

        *self.db.write().await = Some(db);
        info!("MongoDB connected successfully.");
        Ok(())
    }

    async fn validate(&self, item: &WorkItem) -> Result<()> {
        if item.payload.collection.trim().is_empty() {
            return Err(DbLayerError::Validation(
                "missing/incorrect 'collection' String property in job payload".into(),
            ));
        }
        if item.payload.action.trim().is_empty() {
            return Err(DbLayerError::Validation(
                "missing/incorrect 'action' String property in job payload".into(),
            ));
        }
        Ok(())
    }

    async fn process(&self, item: &WorkItem) -> Result<QueryOutcome> {
        let db = {
            let guard = self.db.read().await;
            guard.as_ref().cloned().ok_or_else(|| {
                DbLayerError::Operation("provider is not initialized; call init first".into())
            })?
        };

        let collection = match self.collection_options()? {
            Some(options) => {
                db.collection_with_options::<Document>(&item.payload.collection, options)
            }
            None => db.collection::<Document>(&item.payload.collection),
        };

        trace!(
            collection = %item.payload.collection,
            action = %item.payload.action,
            args = ?item.payload.args,
            "executing query"
        );
        actions::dispatch(&collection, &item.payload.action, &item.payload.args).await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mongodb
    }
}

fn string_option(value: &Bson, name: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            DbLayerError::Connection(format!("incorrect '{}' string option in configuration", name))
        })
}

fn u32_option(value: &Bson, name: &str) -> Result<u32> {
    let n = match value {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        _ => -1,
    };
    u32::try_from(n).map_err(|_| {
        DbLayerError::Connection(format!("incorrect '{}' number option in configuration", name))
    })
}
