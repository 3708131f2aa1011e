//! Work items: one unit of pipeline work carrying a database query job

use crate::error::{DbLayerError, Result};
use dblayer_types::Nature;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The database query job carried by a work item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPayload {
    /// Name of the target collection
    pub collection: String,

    /// Name of the driver operation to invoke (e.g. "find", "insertMany")
    pub action: String,

    /// Positional arguments forwarded to the driver operation
    #[serde(default)]
    pub args: Vec<Value>,
}

impl QueryPayload {
    /// Create a new query payload
    pub fn new(collection: impl Into<String>, action: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            collection: collection.into(),
            action: action.into(),
            args,
        }
    }
}

/// One unit of pipeline work: a nature tag plus a query job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Routing/validation tag
    pub nature: Nature,

    /// The query job itself
    pub payload: QueryPayload,
}

impl WorkItem {
    /// Create a database/query work item for the given job
    pub fn query(payload: QueryPayload) -> Self {
        Self {
            nature: Nature::database_query(),
            payload,
        }
    }

    /// Decode a work item from loose host JSON, reporting the first
    /// missing or mistyped field by name.
    ///
    /// Unlike the serde derive, this reproduces the adapter's historical
    /// field-by-field messages, which hosts match on.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| DbLayerError::Validation("missing/incorrect work item object".into()))?;

        let nature = root
            .get("nature")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                DbLayerError::Validation(
                    "missing/incorrect 'nature' object property in work item".into(),
                )
            })?;
        let kind = nature.get("type").and_then(Value::as_str).ok_or_else(|| {
            DbLayerError::Validation(
                "missing/incorrect 'type' String property in work item nature".into(),
            )
        })?;
        let quality = nature.get("quality").and_then(Value::as_str).ok_or_else(|| {
            DbLayerError::Validation(
                "missing/incorrect 'quality' String property in work item nature".into(),
            )
        })?;

        let payload = root
            .get("payload")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                DbLayerError::Validation(
                    "missing/incorrect 'payload' object property in work item".into(),
                )
            })?;
        let collection = payload
            .get("collection")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DbLayerError::Validation(
                    "missing/incorrect 'collection' String property in job payload".into(),
                )
            })?;
        let action = payload.get("action").and_then(Value::as_str).ok_or_else(|| {
            DbLayerError::Validation(
                "missing/incorrect 'action' String property in job payload".into(),
            )
        })?;
        let args = payload.get("args").and_then(Value::as_array).ok_or_else(|| {
            DbLayerError::Validation(
                "missing/incorrect 'args' Array property in job payload".into(),
            )
        })?;

        Ok(Self {
            nature: Nature::new(kind, quality),
            payload: QueryPayload::new(collection, action, args.clone()),
        })
    }
}
