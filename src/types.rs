//! Convenience types shared by the provider and its resources.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Provider metadata: name, version and the types it manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Provider name as used in resource type prefixes.
    pub name: String,
    /// Provider version.
    pub version: String,
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

/// Split a `/`-separated import identifier into exactly `parts.len()` segments.
///
/// `parts` names the segments for the error message, e.g.
/// `["organization", "project", "rule-id"]`. Empty segments are rejected.
pub fn split_import_id<'a>(id: &'a str, parts: &[&str]) -> Result<Vec<&'a str>, ProviderError> {
    let segments: Vec<&str> = id.split('/').collect();
    if segments.len() != parts.len() || segments.iter().any(|s| s.is_empty()) {
        return Err(ProviderError::InvalidImportId(format!(
            "'{}', expected {}",
            id,
            parts.join("/")
        )));
    }
    Ok(segments)
}
