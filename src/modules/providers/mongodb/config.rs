//! MongoDB provider configuration
//!
//! The provider accepts either a direct connection `url` or a structured
//! `{databaseName, servers, options, collectionOptions}` descriptor. Checks
//! run in a fixed order and the first violation wins, naming the offending
//! field (and server index) the same way the adapter always has.

use bson::Document;
use dblayer_core::{DbLayerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connection-string scheme prefix
const SCHEME: &str = "mongodb://";

/// One server of the target topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// A hostname, an IP address or a unix domain socket
    pub host: String,

    /// A port
    pub port: u16,
}

/// Derive the canonical connection string from structured topology data.
///
/// Deterministic and free of I/O: comma-joined `host:port` pairs in input
/// order, then `/` and the database name.
pub fn build_url(database_name: &str, servers: &[ServerEntry]) -> String {
    let hosts = servers
        .iter()
        .map(|s| format!("{}:{}", s.host, s.port))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{}/{}", SCHEME, hosts, database_name)
}

/// Validated MongoDB provider configuration
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Canonical connection string
    pub url: String,

    /// Options applied to the driver client at connect time
    pub options: Document,

    /// Options applied when opening a collection during process
    pub collection_options: Document,
}

impl MongoConfig {
    /// Validate a raw configuration value and normalize it.
    ///
    /// A supplied `url` takes precedence: the structured topology fields
    /// are discarded entirely, not merely ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            DbLayerError::Configuration("missing/incorrect 'configuration' object property".into())
        })?;

        if let Some(url) = root.get("url") {
            let url = url.as_str().ok_or_else(|| {
                DbLayerError::Configuration(
                    "incorrect 'url' string property in configuration".into(),
                )
            })?;
            return Ok(Self {
                url: url.to_string(),
                options: Document::new(),
                collection_options: Document::new(),
            });
        }

        let database_name = root.get("databaseName").and_then(Value::as_str).ok_or_else(|| {
            DbLayerError::Configuration(
                "missing/incorrect 'databaseName' string property in configuration".into(),
            )
        })?;

        let servers = root.get("servers").and_then(Value::as_array).ok_or_else(|| {
            DbLayerError::Configuration(
                "missing/incorrect 'servers' array property in configuration".into(),
            )
        })?;
        if servers.is_empty() {
            return Err(DbLayerError::Configuration(
                "empty 'servers' array property in configuration".into(),
            ));
        }
        let mut entries = Vec::with_capacity(servers.len());
        for (index, server) in servers.iter().enumerate() {
            let host = server.get("host").and_then(Value::as_str).ok_or_else(|| {
                DbLayerError::Configuration(format!(
                    "missing/incorrect 'host' string property in configuration.servers[{}]",
                    index
                ))
            })?;
            let port = server
                .get("port")
                .and_then(Value::as_i64)
                .and_then(|p| u16::try_from(p).ok())
                .ok_or_else(|| {
                    DbLayerError::Configuration(format!(
                        "missing/incorrect 'port' number property in configuration.servers[{}]",
                        index
                    ))
                })?;
            entries.push(ServerEntry {
                host: host.to_string(),
                port,
            });
        }

        let options = optional_document(root, "options")?;
        let collection_options = optional_document(root, "collectionOptions")?;

        Ok(Self {
            url: build_url(database_name, &entries),
            options,
            collection_options,
        })
    }
}

/// Read an optional object field as a BSON document; present-but-not-object
/// is an error naming the field.
fn optional_document(
    root: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<Document> {
    match root.get(field) {
        None => Ok(Document::new()),
        Some(value) if value.is_object() => bson::to_document(value).map_err(|e| {
            DbLayerError::Configuration(format!(
                "incorrect '{}' object property in configuration: {}",
                field, e
            ))
        }),
        Some(_) => Err(DbLayerError::Configuration(format!(
            "incorrect '{}' object property in configuration",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_single_server() {
        let servers = vec![ServerEntry {
            host: "localhost".into(),
            port: 27017,
        }];
        assert_eq!(
            build_url("db-layer-tests", &servers),
            "mongodb://localhost:27017/db-layer-tests"
        );
    }

    #[test]
    fn test_build_url_preserves_server_order() {
        let servers = vec![
            ServerEntry {
                host: "alpha".into(),
                port: 27017,
            },
            ServerEntry {
                host: "beta".into(),
                port: 27018,
            },
        ];
        assert_eq!(
            build_url("etap", &servers),
            "mongodb://alpha:27017,beta:27018/etap"
        );
    }

    #[test]
    fn test_from_value_structured() {
        let config = MongoConfig::from_value(&json!({
            "databaseName": "db-layer-tests",
            "servers": [{ "host": "localhost", "port": 27017 }],
            "options": {}
        }))
        .unwrap();
        assert_eq!(config.url, "mongodb://localhost:27017/db-layer-tests");
        assert!(config.options.is_empty());
        assert!(config.collection_options.is_empty());
    }

    #[test]
    fn test_from_value_url_takes_precedence_and_discards_topology() {
        let config = MongoConfig::from_value(&json!({
            "url": "mongodb://remote:27018/other",
            "databaseName": "ignored",
            "servers": [{ "host": "ignored", "port": 1 }],
            "options": { "maxPoolSize": 5 },
            "collectionOptions": { "readConcern": { "level": "majority" } }
        }))
        .unwrap();
        assert_eq!(config.url, "mongodb://remote:27018/other");
        assert!(config.options.is_empty());
        assert!(config.collection_options.is_empty());
    }

    #[test]
    fn test_from_value_incorrect_url_type() {
        let err = MongoConfig::from_value(&json!({ "url": 42 })).unwrap_err();
        assert!(err.to_string().contains("'url'"));
    }

    #[test]
    fn test_from_value_missing_database_name() {
        let err = MongoConfig::from_value(&json!({
            "servers": [{ "host": "localhost", "port": 27017 }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'databaseName'"));
    }

    #[test]
    fn test_from_value_missing_servers() {
        let err = MongoConfig::from_value(&json!({ "databaseName": "etap" })).unwrap_err();
        assert!(err.to_string().contains("'servers'"));
    }

    #[test]
    fn test_from_value_empty_servers() {
        let err = MongoConfig::from_value(&json!({
            "databaseName": "etap",
            "servers": []
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'servers'"));
    }

    #[test]
    fn test_from_value_bad_server_entries_report_index() {
        let err = MongoConfig::from_value(&json!({
            "databaseName": "etap",
            "servers": [
                { "host": "localhost", "port": 27017 },
                { "host": 42, "port": 27017 }
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("servers[1]"));
        assert!(err.to_string().contains("'host'"));

        let err = MongoConfig::from_value(&json!({
            "databaseName": "etap",
            "servers": [{ "host": "localhost", "port": "27017" }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("servers[0]"));
        assert!(err.to_string().contains("'port'"));
    }

    #[test]
    fn test_from_value_options_must_be_objects() {
        let err = MongoConfig::from_value(&json!({
            "databaseName": "etap",
            "servers": [{ "host": "localhost", "port": 27017 }],
            "options": "nope"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'options'"));

        let err = MongoConfig::from_value(&json!({
            "databaseName": "etap",
            "servers": [{ "host": "localhost", "port": 27017 }],
            "collectionOptions": 3
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'collectionOptions'"));
    }

    #[test]
    fn test_from_value_not_an_object() {
        assert!(MongoConfig::from_value(&json!(null)).is_err());
        assert!(MongoConfig::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_from_value_retains_options_documents() {
        let config = MongoConfig::from_value(&json!({
            "databaseName": "etap",
            "servers": [{ "host": "localhost", "port": 27017 }],
            "options": { "maxPoolSize": 10 },
            "collectionOptions": { "readConcern": { "level": "local" } }
        }))
        .unwrap();
        assert_eq!(config.options.get_i64("maxPoolSize").ok(), Some(10));
        assert!(config.collection_options.get_document("readConcern").is_ok());
    }
}
