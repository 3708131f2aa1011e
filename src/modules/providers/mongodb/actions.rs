//! Action dispatch and result normalization
//!
//! Work items name driver operations the way the node driver spells them
//! ("find", "insertMany", ...) and pass positional JSON arguments. This
//! module maps each supported action onto the typed driver call, converts
//! arguments at the boundary, and normalizes every result into a
//! `QueryOutcome`. Write results keep the node-driver field names
//! (`insertedCount`, `matchedCount`, `deletedCount`, ...), which hosts
//! already consume.

use crate::traits::QueryOutcome;
use bson::{doc, Bson, Document};
use dblayer_core::{DbLayerError, Result};
use futures::TryStreamExt;
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::{Collection, Cursor};
use serde_json::Value;
use std::collections::HashMap;

/// Execute the named action on the collection with the given arguments
pub(crate) async fn dispatch(
    collection: &Collection<Document>,
    action: &str,
    args: &[Value],
) -> Result<QueryOutcome> {
    match action {
        "find" => {
            let filter = optional_doc(args, 0, "filter", action)?;
            let options = find_options(optional_doc(args, 1, "options", action)?);
            let cursor = collection.find(filter, options).await.map_err(operation)?;
            drain(cursor).await
        }
        "findOne" => {
            let filter = optional_doc(args, 0, "filter", action)?;
            let options = find_one_options(optional_doc(args, 1, "options", action)?);
            let found = collection
                .find_one(filter, options)
                .await
                .map_err(operation)?;
            Ok(QueryOutcome::Single(
                found.map(Bson::Document).unwrap_or(Bson::Null),
            ))
        }
        "aggregate" => {
            let pipeline = doc_array(args, 0, "pipeline", action)?;
            let cursor = collection
                .aggregate(pipeline, None)
                .await
                .map_err(operation)?;
            drain(cursor).await
        }
        "insertOne" => {
            let document = required_doc(args, 0, "document", action)?;
            let result = collection
                .insert_one(document, None)
                .await
                .map_err(operation)?;
            Ok(QueryOutcome::Single(Bson::Document(
                doc! { "insertedId": result.inserted_id },
            )))
        }
        "insertMany" => {
            let documents = doc_array(args, 0, "documents", action)?;
            let result = collection
                .insert_many(documents, None)
                .await
                .map_err(operation)?;
            Ok(insert_many_outcome(&result.inserted_ids))
        }
        "updateOne" => {
            let filter = required_doc(args, 0, "filter", action)?;
            let update = required_doc(args, 1, "update", action)?;
            let result = collection
                .update_one(filter, update, None)
                .await
                .map_err(operation)?;
            Ok(update_outcome(
                result.matched_count,
                result.modified_count,
                result.upserted_id,
            ))
        }
        "updateMany" => {
            let filter = required_doc(args, 0, "filter", action)?;
            let update = required_doc(args, 1, "update", action)?;
            let result = collection
                .update_many(filter, update, None)
                .await
                .map_err(operation)?;
            Ok(update_outcome(
                result.matched_count,
                result.modified_count,
                result.upserted_id,
            ))
        }
        "replaceOne" => {
            let filter = required_doc(args, 0, "filter", action)?;
            let replacement = required_doc(args, 1, "replacement", action)?;
            let result = collection
                .replace_one(filter, replacement, None)
                .await
                .map_err(operation)?;
            Ok(update_outcome(
                result.matched_count,
                result.modified_count,
                result.upserted_id,
            ))
        }
        "deleteOne" => {
            let filter = optional_doc(args, 0, "filter", action)?.unwrap_or_default();
            let result = collection
                .delete_one(filter, None)
                .await
                .map_err(operation)?;
            Ok(QueryOutcome::Single(Bson::Document(
                doc! { "deletedCount": result.deleted_count as i64 },
            )))
        }
        "deleteMany" => {
            let filter = optional_doc(args, 0, "filter", action)?.unwrap_or_default();
            let result = collection
                .delete_many(filter, None)
                .await
                .map_err(operation)?;
            Ok(QueryOutcome::Single(Bson::Document(
                doc! { "deletedCount": result.deleted_count as i64 },
            )))
        }
        "countDocuments" => {
            let filter = optional_doc(args, 0, "filter", action)?;
            let count = collection
                .count_documents(filter, None)
                .await
                .map_err(operation)?;
            Ok(QueryOutcome::Single(Bson::Int64(count as i64)))
        }
        "distinct" => {
            let field = args.first().and_then(Value::as_str).ok_or_else(|| {
                DbLayerError::Validation(
                    "missing/incorrect 'field' String argument for action 'distinct'".into(),
                )
            })?;
            let filter = optional_doc(args, 1, "filter", action)?;
            let values = collection
                .distinct(field, filter, None)
                .await
                .map_err(operation)?;
            Ok(QueryOutcome::Single(Bson::Array(values)))
        }
        other => Err(unsupported(other)),
    }
}

fn operation(e: mongodb::error::Error) -> DbLayerError {
    DbLayerError::Operation(e.to_string())
}

pub(crate) fn unsupported(action: &str) -> DbLayerError {
    DbLayerError::Operation(format!("unsupported action '{}'", action))
}

/// Drain a cursor into an eager batch. The action itself already
/// succeeded at this point, so a failure here is the distinct
/// result-drain error.
async fn drain(cursor: Cursor<Document>) -> Result<QueryOutcome> {
    let docs = cursor
        .try_collect::<Vec<Document>>()
        .await
        .map_err(|e| DbLayerError::ResultDrain(e.to_string()))?;
    Ok(QueryOutcome::Batch(docs))
}

/// Fetch an optional positional document argument
fn optional_doc(args: &[Value], idx: usize, name: &str, action: &str) -> Result<Option<Document>> {
    match args.get(idx) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if value.is_object() => {
            bson::to_document(value).map(Some).map_err(|e| {
                DbLayerError::Validation(format!(
                    "incorrect '{}' document argument for action '{}': {}",
                    name, action, e
                ))
            })
        }
        Some(_) => Err(DbLayerError::Validation(format!(
            "incorrect '{}' document argument for action '{}'",
            name, action
        ))),
    }
}

/// Fetch a required positional document argument
fn required_doc(args: &[Value], idx: usize, name: &str, action: &str) -> Result<Document> {
    optional_doc(args, idx, name, action)?.ok_or_else(|| {
        DbLayerError::Validation(format!(
            "missing '{}' document argument for action '{}'",
            name, action
        ))
    })
}

/// Fetch a positional argument that must be an array of documents
fn doc_array(args: &[Value], idx: usize, name: &str, action: &str) -> Result<Vec<Document>> {
    let values = args.get(idx).and_then(Value::as_array).ok_or_else(|| {
        DbLayerError::Validation(format!(
            "missing/incorrect '{}' array argument for action '{}'",
            name, action
        ))
    })?;
    values
        .iter()
        .map(|value| {
            bson::to_document(value).map_err(|e| {
                DbLayerError::Validation(format!(
                    "incorrect '{}' array argument for action '{}': {}",
                    name, action, e
                ))
            })
        })
        .collect()
}

fn bson_int(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(d) if d.fract() == 0.0 => Some(*d as i64),
        _ => None,
    }
}

/// Map the recognized subset of node-driver find options
fn find_options(options: Option<Document>) -> Option<FindOptions> {
    let doc = options?;
    let mut opts = FindOptions::default();
    opts.limit = doc.get("limit").and_then(bson_int);
    opts.skip = doc
        .get("skip")
        .and_then(bson_int)
        .and_then(|v| u64::try_from(v).ok());
    opts.sort = doc.get_document("sort").ok().cloned();
    opts.projection = doc.get_document("projection").ok().cloned();
    opts.batch_size = doc
        .get("batchSize")
        .and_then(bson_int)
        .and_then(|v| u32::try_from(v).ok());
    Some(opts)
}

fn find_one_options(options: Option<Document>) -> Option<FindOneOptions> {
    let doc = options?;
    let mut opts = FindOneOptions::default();
    opts.skip = doc
        .get("skip")
        .and_then(bson_int)
        .and_then(|v| u64::try_from(v).ok());
    opts.sort = doc.get_document("sort").ok().cloned();
    opts.projection = doc.get_document("projection").ok().cloned();
    Some(opts)
}

fn insert_many_outcome(inserted_ids: &HashMap<usize, Bson>) -> QueryOutcome {
    let mut indices: Vec<usize> = inserted_ids.keys().copied().collect();
    indices.sort_unstable();
    let mut ids = Document::new();
    for index in indices {
        ids.insert(index.to_string(), inserted_ids[&index].clone());
    }
    QueryOutcome::Single(Bson::Document(doc! {
        "insertedCount": inserted_ids.len() as i64,
        "insertedIds": ids,
    }))
}

fn update_outcome(matched: u64, modified: u64, upserted_id: Option<Bson>) -> QueryOutcome {
    let mut result = doc! {
        "matchedCount": matched as i64,
        "modifiedCount": modified as i64,
    };
    if let Some(id) = upserted_id {
        result.insert("upsertedId", id);
    }
    QueryOutcome::Single(Bson::Document(result))
}
