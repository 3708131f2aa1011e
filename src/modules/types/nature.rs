//! Work-item nature tags
//!
//! Every work item carries a `{type, quality}` nature used by the host
//! pipeline for routing and by the adapter facade for validation.

use serde::{Deserialize, Serialize};

/// Nature type handled by the database layer
pub const TYPE_DATABASE: &str = "database";

/// Nature quality handled by the database layer
pub const QUALITY_QUERY: &str = "query";

/// Routing/validation tag carried by a work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nature {
    /// Broad category of the work item (e.g. "database")
    #[serde(rename = "type")]
    pub kind: String,

    /// Refinement within the category (e.g. "query")
    pub quality: String,
}

impl Nature {
    /// Create a new nature tag
    pub fn new(kind: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            quality: quality.into(),
        }
    }

    /// The nature accepted by the database layer
    pub fn database_query() -> Self {
        Self::new(TYPE_DATABASE, QUALITY_QUERY)
    }

    /// True if the type matches "database" (trimmed, case-insensitive)
    pub fn is_database(&self) -> bool {
        self.kind.trim().eq_ignore_ascii_case(TYPE_DATABASE)
    }

    /// True if the quality matches "query" (trimmed, case-insensitive)
    pub fn is_query(&self) -> bool {
        self.quality.trim().eq_ignore_ascii_case(QUALITY_QUERY)
    }
}
