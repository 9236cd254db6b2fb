// Quality, SLA, freshness, schema, and documentation metadata carried by
// catalog nodes. All blocks are optional and purely descriptive; the
// resolver passes them through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataQuality {
    #[serde(default)]
    pub dq_owner: Option<String>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub validation_rules: Vec<String>,
    #[serde(default)]
    pub known_issues: Vec<String>,
    /// ISO timestamp of the last validation run.
    #[serde(default)]
    pub last_validated: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sla {
    #[serde(default)]
    pub freshness: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub support_hours: Option<String>,
    #[serde(default)]
    pub escalation_contact: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Freshness {
    #[serde(default)]
    pub last_loaded: Option<String>,
    #[serde(default)]
    pub refresh_schedule: Option<String>,
    #[serde(default)]
    pub source_system: Option<String>,
    #[serde(default)]
    pub upstream_dependencies: Vec<String>,
}

/// Schema definition for a single column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    /// "string", "float", "date", "integer", "boolean"
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub description: String,
    /// "identifier", "measure", "dimension", "timestamp"
    #[serde(default)]
    pub semantic_type: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Moniker path of the referenced asset.
    #[serde(default)]
    pub foreign_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataSchema {
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub semantic_tags: Vec<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub related_monikers: Vec<String>,
    #[serde(default)]
    pub granularity: Option<String>,
    /// e.g. "1K-10K", "1M-10M"
    #[serde(default)]
    pub typical_row_count: Option<String>,
    /// e.g. "daily", "real-time", "monthly"
    #[serde(default)]
    pub update_frequency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Documentation {
    #[serde(default)]
    pub glossary_url: Option<String>,
    #[serde(default)]
    pub runbook_url: Option<String>,
    #[serde(default)]
    pub onboarding_url: Option<String>,
    #[serde(default)]
    pub data_dictionary_url: Option<String>,
    #[serde(default)]
    pub api_docs_url: Option<String>,
    #[serde(default)]
    pub architecture_url: Option<String>,
    #[serde(default)]
    pub changelog_url: Option<String>,
    #[serde(default)]
    pub contact_url: Option<String>,
    #[serde(default)]
    pub additional_links: BTreeMap<String, String>,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.glossary_url.is_none()
            && self.runbook_url.is_none()
            && self.onboarding_url.is_none()
            && self.data_dictionary_url.is_none()
            && self.api_docs_url.is_none()
            && self.architecture_url.is_none()
            && self.changelog_url.is_none()
            && self.contact_url.is_none()
            && self.additional_links.is_empty()
    }
}
