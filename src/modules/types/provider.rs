//! Backend provider kind definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported backend provider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// MongoDB document database
    Mongodb,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Mongodb => write!(f, "mongodb"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(ProviderKind::Mongodb),
            _ => Err(format!("Unknown provider kind: {}", s)),
        }
    }
}

impl ProviderKind {
    /// Returns all supported provider kinds
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Mongodb]
    }

    /// Returns true if this provider is a document database
    pub fn is_document(&self) -> bool {
        matches!(self, ProviderKind::Mongodb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!(ProviderKind::from_str("mongodb").unwrap(), ProviderKind::Mongodb);
        assert_eq!(ProviderKind::from_str("mongo").unwrap(), ProviderKind::Mongodb);
        assert_eq!(ProviderKind::from_str("MongoDB").unwrap(), ProviderKind::Mongodb);
        assert!(ProviderKind::from_str("unknownprovider").is_err());
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::Mongodb.to_string(), "mongodb");
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&ProviderKind::Mongodb).unwrap();
        assert_eq!(json, "\"mongodb\"");

        let kind: ProviderKind = serde_json::from_str("\"mongodb\"").unwrap();
        assert_eq!(kind, ProviderKind::Mongodb);
    }
}
