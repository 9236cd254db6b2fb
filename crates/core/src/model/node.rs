// Catalog nodes - the records making up the hierarchy, keyed by canonical
// path. A node carries description, governance, an optional source binding,
// an optional access policy, and lifecycle state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    AccessPolicy, DataQuality, DataSchema, Documentation, Freshness, Ownership, Sla, SourceBinding,
};

/// Lifecycle status of a catalog node.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Being defined, not visible to clients.
    Draft,
    /// Submitted for governance review.
    PendingReview,
    /// Governance approved, ready to activate.
    Approved,
    /// Live and resolvable.
    #[default]
    Active,
    /// Still works but clients are warned.
    Deprecated,
    /// No longer resolvable.
    Archived,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Draft => "draft",
            NodeStatus::PendingReview => "pending_review",
            NodeStatus::Approved => "approved",
            NodeStatus::Active => "active",
            NodeStatus::Deprecated => "deprecated",
            NodeStatus::Archived => "archived",
        }
    }

    /// Whether a binding on a node in this status may be served.
    pub fn serves_bindings(&self) -> bool {
        !matches!(
            self,
            NodeStatus::Archived | NodeStatus::Draft | NodeStatus::PendingReview
        )
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogNode {
    /// Canonical path key. Declarative files carry it as the mapping key,
    /// not as a field; the loader injects it.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,

    /// Domain mapping for top-level nodes.
    #[serde(default)]
    pub domain: Option<String>,

    /// Ownership block; fields inherit independently from ancestors.
    #[serde(default)]
    pub ownership: Option<Ownership>,

    /// Source binding; typically only leaf nodes carry one.
    #[serde(default)]
    pub source_binding: Option<SourceBinding>,

    #[serde(default)]
    pub data_quality: Option<DataQuality>,
    #[serde(default)]
    pub sla: Option<Sla>,
    #[serde(default)]
    pub freshness: Option<Freshness>,

    /// Machine-readable schema for discoverability.
    #[serde(default)]
    pub schema: Option<DataSchema>,

    #[serde(default)]
    pub access_policy: Option<AccessPolicy>,

    #[serde(default)]
    pub documentation: Option<Documentation>,

    #[serde(default = "default_classification")]
    pub classification: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub deprecation_message: Option<String>,

    /// Replacement path for a deprecated node.
    #[serde(default)]
    pub successor: Option<String>,
    #[serde(default)]
    pub sunset_deadline: Option<String>,
    #[serde(default)]
    pub migration_guide_url: Option<String>,

    /// Leaf nodes carry actual data; category nodes contain children.
    #[serde(default)]
    pub is_leaf: bool,
}

fn default_classification() -> String {
    "internal".to_string()
}

impl CatalogNode {
    /// Synthesized stand-in for a path with no registered node. Placeholders
    /// never appear in listings, never carry bindings, and contribute
    /// nothing to inheritance.
    pub fn placeholder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            classification: default_classification(),
            ..Self::default()
        }
    }
}
