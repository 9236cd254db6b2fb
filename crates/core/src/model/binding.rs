// Source bindings - the association of a catalog node with a concrete
// backend. The binding config is opaque to the engine except for the
// reserved "query" key, which the resolver renders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;

/// Supported backend kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Snowflake,
    Oracle,
    Mssql,
    Rest,
    Static,
    Excel,
    Bloomberg,
    Refinitiv,
    Opensearch,
    /// Combines multiple sources.
    Composite,
    /// Computed from other monikers.
    Derived,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Snowflake => "snowflake",
            SourceType::Oracle => "oracle",
            SourceType::Mssql => "mssql",
            SourceType::Rest => "rest",
            SourceType::Static => "static",
            SourceType::Excel => "excel",
            SourceType::Bloomberg => "bloomberg",
            SourceType::Refinitiv => "refinitiv",
            SourceType::Opensearch => "opensearch",
            SourceType::Composite => "composite",
            SourceType::Derived => "derived",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache configuration for expensive backend queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryCacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub ttl_seconds: u64,
    #[serde(default)]
    pub refresh_interval_seconds: u64,
    #[serde(default)]
    pub refresh_on_startup: bool,
}

/// Binding of a catalog node to an actual data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceBinding {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub allowed_operations: Vec<String>,
    #[serde(default)]
    pub schema: Option<Map<String, Value>>,
    #[serde(default = "default_read_only")]
    pub read_only: bool,
    #[serde(default)]
    pub cache: Option<QueryCacheConfig>,
}

fn default_read_only() -> bool {
    true
}

impl SourceBinding {
    /// The query template carried in the config, when present.
    pub fn query_template(&self) -> Option<&str> {
        self.config.get("query").and_then(Value::as_str)
    }

    /// Change-detection fingerprint: the first 8 bytes of the SHA-256 of the
    /// canonical serialization, rendered as 16 hex characters.
    ///
    /// The serialization contract is sorted-key, minimal-whitespace JSON
    /// over `{source_type, config, allowed_operations, schema, read_only}`.
    /// External systems compare these byte-for-byte.
    pub fn fingerprint(&self) -> String {
        let mut doc = Map::new();
        doc.insert(
            "allowed_operations".to_string(),
            Value::from(self.allowed_operations.clone()),
        );
        doc.insert("config".to_string(), Value::Object(self.config.clone()));
        doc.insert("read_only".to_string(), Value::Bool(self.read_only));
        doc.insert(
            "schema".to_string(),
            self.schema.clone().map(Value::Object).unwrap_or(Value::Null),
        );
        doc.insert(
            "source_type".to_string(),
            Value::String(self.source_type.as_str().to_string()),
        );

        // serde_json maps are BTreeMaps, so nested objects serialize with
        // sorted keys as well.
        let raw = serde_json::to_vec(&Value::Object(doc))
            .expect("canonical fingerprint document serializes");
        let digest = Sha256::digest(&raw);
        digest[..8].iter().fold(String::with_capacity(16), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_binding() -> SourceBinding {
        let mut config = Map::new();
        config.insert("warehouse".to_string(), json!("ANALYTICS_WH"));
        config.insert("database".to_string(), json!("MARKET_DATA"));
        config.insert("query".to_string(), json!("SELECT 1"));
        SourceBinding {
            source_type: SourceType::Snowflake,
            config,
            allowed_operations: vec!["read".to_string()],
            schema: None,
            read_only: true,
            cache: None,
        }
    }

    #[test]
    fn fingerprint_is_stable_across_calls() {
        let binding = sample_binding();
        assert_eq!(binding.fingerprint(), binding.fingerprint());
        assert_eq!(binding.fingerprint().len(), 16);
    }

    #[test]
    fn fingerprint_ignores_config_insertion_order() {
        let mut reordered = Map::new();
        reordered.insert("query".to_string(), json!("SELECT 1"));
        reordered.insert("database".to_string(), json!("MARKET_DATA"));
        reordered.insert("warehouse".to_string(), json!("ANALYTICS_WH"));
        let binding = SourceBinding {
            config: reordered,
            ..sample_binding()
        };
        assert_eq!(binding.fingerprint(), sample_binding().fingerprint());
    }

    #[test]
    fn fingerprint_tracks_contract_changes() {
        let mut changed = sample_binding();
        changed.read_only = false;
        assert_ne!(changed.fingerprint(), sample_binding().fingerprint());
    }

    #[test]
    fn read_only_defaults_to_true() {
        let binding: SourceBinding = serde_yaml::from_str("type: rest").unwrap();
        assert!(binding.read_only);
        assert!(binding.config.is_empty());
    }

    #[test]
    fn query_template_reads_reserved_key() {
        assert_eq!(sample_binding().query_template(), Some("SELECT 1"));
    }
}
