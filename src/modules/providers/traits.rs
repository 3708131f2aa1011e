//! Provider trait definition and the normalized query outcome

use async_trait::async_trait;
use bson::{Bson, Document};
use dblayer_core::{Result, WorkItem};
use dblayer_types::ProviderKind;

/// Normalized result of one processed work item
///
/// The shape is decided once at the driver boundary: cursor-producing
/// actions are drained into `Batch`, everything else is a `Single` value.
/// Nothing downstream inspects driver types.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A finite, eagerly materialized sequence of records
    Batch(Vec<Document>),

    /// A single opaque record or acknowledgement value
    Single(Bson),
}

impl QueryOutcome {
    /// True if this outcome is a materialized record sequence
    pub fn is_batch(&self) -> bool {
        matches!(self, QueryOutcome::Batch(_))
    }

    /// Number of records in a batch outcome, 1 otherwise
    pub fn len(&self) -> usize {
        match self {
            QueryOutcome::Batch(docs) => docs.len(),
            QueryOutcome::Single(_) => 1,
        }
    }

    /// True if this is an empty batch
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutcome::Batch(docs) if docs.is_empty())
    }

    /// Render the outcome as host-facing JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            QueryOutcome::Batch(docs) => serde_json::Value::Array(
                docs.iter().map(|d| bson_to_json(Bson::Document(d.clone()))).collect(),
            ),
            QueryOutcome::Single(value) => bson_to_json(value.clone()),
        }
    }
}

/// Convert a BSON value to JSON, rendering ObjectIds as hex and datetimes
/// as RFC 3339 strings.
pub fn bson_to_json(bson: Bson) -> serde_json::Value {
    match bson {
        Bson::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
        Bson::DateTime(dt) => serde_json::Value::String(
            chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| dt.to_string()),
        ),
        Bson::Document(doc) => {
            let mut m = serde_json::Map::new();
            for (key, value) in doc {
                m.insert(key, bson_to_json(value));
            }
            serde_json::Value::Object(m)
        }
        Bson::Array(arr) => serde_json::Value::Array(arr.into_iter().map(bson_to_json).collect()),
        Bson::Decimal128(d) => serde_json::Value::String(d.to_string()),
        other => bson::from_bson(other).unwrap_or(serde_json::Value::Null),
    }
}

/// Trait for backend database providers
///
/// All providers implement this trait to expose the uniform
/// initialize/validate/process contract to the adapter facade.
#[async_trait]
pub trait DbProvider: Send + Sync {
    /// Establish the backing connection; must succeed before the first
    /// `process` call. A failed init leaves the provider uninitialized.
    async fn init(&self) -> Result<()>;

    /// Structurally check a work item's payload. Performs no I/O and
    /// requires no connection.
    async fn validate(&self, item: &WorkItem) -> Result<()>;

    /// Execute the work item's query job and return the normalized outcome
    async fn process(&self, item: &WorkItem) -> Result<QueryOutcome>;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_outcome_batch() {
        let outcome = QueryOutcome::Batch(vec![doc! { "a": 1 }, doc! { "b": 2 }]);
        assert!(outcome.is_batch());
        assert!(!outcome.is_empty());
        assert_eq!(outcome.len(), 2);

        let json = outcome.to_json();
        assert_eq!(json[0]["a"], serde_json::json!(1));
        assert_eq!(json[1]["b"], serde_json::json!(2));
    }

    #[test]
    fn test_outcome_single() {
        let outcome = QueryOutcome::Single(Bson::Document(doc! { "insertedCount": 1_i64 }));
        assert!(!outcome.is_batch());
        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome.to_json()["insertedCount"], serde_json::json!(1));
    }

    #[test]
    fn test_bson_to_json_object_id_as_hex() {
        let oid = bson::oid::ObjectId::new();
        let json = bson_to_json(Bson::ObjectId(oid));
        assert_eq!(json, serde_json::Value::String(oid.to_hex()));
    }

    #[test]
    fn test_bson_to_json_null_and_scalars() {
        assert_eq!(bson_to_json(Bson::Null), serde_json::Value::Null);
        assert_eq!(bson_to_json(Bson::Int32(7)), serde_json::json!(7));
        assert_eq!(
            bson_to_json(Bson::String("ok".into())),
            serde_json::json!("ok")
        );
    }
}
