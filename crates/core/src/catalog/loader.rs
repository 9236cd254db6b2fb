// Declarative catalog loader.
//
// A catalog file is a flat YAML mapping from path to node spec - no
// wrapper key. Hierarchy separators in the keys may be '/' or '.'.
// Duplicate top-level keys are a fatal parse error.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::CatalogNode;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read catalog file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("catalog key must be a string, got: {key}")]
    NonStringKey { key: String },

    #[error("invalid node spec at '{path}'")]
    Node {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Load catalog nodes from a declarative YAML file.
///
/// Normalization applied per node spec: missing `status` becomes `active`,
/// missing `classification` becomes `internal`, a binding's `read_only`
/// defaults to true, and a policy's `base_row_count` defaults to 100 (all
/// via the model's serde defaults). Entries with a null body are skipped.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogNode>, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&raw).map_err(|err| match err {
        ParseCatalogError::Document(source) => LoadError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseCatalogError::NonStringKey { key } => LoadError::NonStringKey { key },
        ParseCatalogError::Node { path, source } => LoadError::Node { path, source },
    })
}

enum ParseCatalogError {
    Document(serde_yaml::Error),
    NonStringKey { key: String },
    Node { path: String, source: serde_yaml::Error },
}

/// Parse catalog YAML content. Split out from the file wrapper so tests and
/// the reload endpoint can exercise it without touching disk.
fn parse_catalog(raw: &str) -> Result<Vec<CatalogNode>, ParseCatalogError> {
    // Going through Value first makes duplicate mapping keys a hard error
    // and keeps document order for stable diagnostics.
    let doc: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(ParseCatalogError::Document)?;

    if doc.is_null() {
        return Ok(Vec::new());
    }
    let mapping = doc.as_mapping().cloned().ok_or_else(|| {
        ParseCatalogError::NonStringKey {
            key: "<catalog top level is not a mapping>".to_string(),
        }
    })?;

    let mut nodes = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let node_path = key
            .as_str()
            .ok_or_else(|| ParseCatalogError::NonStringKey {
                key: format!("{key:?}"),
            })?
            .to_string();
        if value.is_null() {
            continue;
        }
        let mut node: CatalogNode =
            serde_yaml::from_value(value).map_err(|source| ParseCatalogError::Node {
                path: node_path.clone(),
                source,
            })?;
        node.path = node_path;
        nodes.push(node);
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeStatus;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
benchmarks:
  display_name: Benchmarks
  ownership:
    accountable_owner: a@x

benchmarks.constituents:
  display_name: Benchmark Constituents
  is_leaf: true
  source_binding:
    type: snowflake
    config:
      warehouse: ANALYTICS_WH
      query: "SELECT * FROM constituents WHERE benchmark = '{segments[1]}'"
  access_policy:
    max_rows_block: 100000

analytics.risk/var:
  display_name: Value at Risk
  status: deprecated
  successor: analytics.risk/var2
"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_flat_mapping_with_mixed_separators() {
        let file = write_temp(SAMPLE);
        let nodes = load_catalog(file.path()).unwrap();
        assert_eq!(nodes.len(), 3);

        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert!(paths.contains(&"benchmarks"));
        assert!(paths.contains(&"benchmarks.constituents"));
        assert!(paths.contains(&"analytics.risk/var"));
    }

    #[test]
    fn normalization_defaults_apply() {
        let file = write_temp(SAMPLE);
        let nodes = load_catalog(file.path()).unwrap();

        let constituents = nodes
            .iter()
            .find(|n| n.path == "benchmarks.constituents")
            .unwrap();
        assert_eq!(constituents.status, NodeStatus::Active);
        assert_eq!(constituents.classification, "internal");
        let binding = constituents.source_binding.as_ref().unwrap();
        assert!(binding.read_only);
        let policy = constituents.access_policy.as_ref().unwrap();
        assert_eq!(policy.base_row_count, 100);

        let var = nodes.iter().find(|n| n.path == "analytics.risk/var").unwrap();
        assert_eq!(var.status, NodeStatus::Deprecated);
        assert_eq!(var.successor.as_deref(), Some("analytics.risk/var2"));
    }

    #[test]
    fn duplicate_top_level_keys_are_fatal() {
        let file = write_temp("a:\n  display_name: one\na:\n  display_name: two\n");
        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "got: {err:?}");
    }

    #[test]
    fn unknown_status_is_a_node_error_naming_the_path() {
        let file = write_temp("bad.node:\n  status: vanished\n");
        let err = load_catalog(file.path()).unwrap_err();
        match err {
            LoadError::Node { path, .. } => assert_eq!(path, "bad.node"),
            other => panic!("expected node error, got {other:?}"),
        }
    }

    #[test]
    fn null_entries_are_skipped() {
        let file = write_temp("a:\n  display_name: one\nplaceholder:\n");
        let nodes = load_catalog(file.path()).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].path, "a");
    }

    #[test]
    fn empty_document_is_an_empty_catalog() {
        let file = write_temp("");
        assert!(load_catalog(file.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_catalog(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
