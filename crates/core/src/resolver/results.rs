// Result types for the resolution entry points.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{CatalogNode, ResolvedOwnership, SourceType};
use crate::moniker::QueryParams;

/// Who asked. Identity is recorded, never enforced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    /// "api", "batch", "ui", ...
    pub source: String,
}

impl CallerIdentity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            username: None,
            source: "api".to_string(),
        }
    }

    pub fn api(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
            source: "api".to_string(),
        }
    }
}

/// The concrete source descriptor handed to client adapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedSource {
    pub source_type: SourceType,
    /// Binding config minus the reserved `query` key.
    pub connection: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub params: QueryParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Map<String, Value>>,
    pub read_only: bool,
}

/// Full resolution output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolveResult {
    /// Canonical moniker string.
    pub moniker: String,
    /// Canonical path the binding was resolved for (the successor path
    /// after a redirect).
    pub path: String,
    pub source: ResolvedSource,
    pub ownership: ResolvedOwnership,
    pub node: CatalogNode,
    /// Where the binding was found: the path itself or an ancestor.
    pub binding_path: String,
    /// Remainder of the requested path below the binding path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    /// Non-fatal access-policy warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Original path when a deprecation successor was followed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
}

/// Metadata about a path, without query rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescribeResult {
    pub node: CatalogNode,
    pub ownership: ResolvedOwnership,
    pub moniker: String,
    pub path: String,
    pub has_source_binding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
}

/// Direct children of a path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResult {
    pub children: Vec<String>,
    pub moniker: String,
    pub path: String,
    pub ownership: ResolvedOwnership,
}

/// Ancestor chain plus resolved ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineageResult {
    pub path: String,
    /// Root-to-self chain of canonical paths.
    pub hierarchy: Vec<String>,
    pub ownership: ResolvedOwnership,
}
