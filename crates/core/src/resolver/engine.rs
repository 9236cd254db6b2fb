// Resolver engine - the main resolution entry point.
//
// resolve() parses a moniker, discovers the serving binding in the
// registry, follows deprecation successors, validates the access policy,
// renders the query template, and composes ownership provenance into the
// final descriptor.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::catalog::{ancestor_paths, Registry};
use crate::model::{CatalogNode, NodeStatus, SourceBinding};
use crate::moniker::{parse_moniker, Moniker, ParseError};
use crate::resolver::renderer::render_query;
use crate::resolver::results::{
    CallerIdentity, DescribeResult, LineageResult, ListResult, ResolveResult, ResolvedSource,
};

/// Upper bound on deprecation-successor hops per resolution.
const MAX_SUCCESSOR_HOPS: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid moniker: {0}")]
    Parse(#[from] ParseError),

    #[error("resolution failed: {reason}")]
    Resolution { reason: String },

    #[error("no source binding found for path '{path}'")]
    NotFound { path: String },

    #[error("{message}")]
    AccessDenied { message: String, estimated_rows: u64 },

    #[error("internal resolution failure: {reason}")]
    Internal { reason: String },
}

/// Moniker resolution over a catalog registry. Stateless apart from the
/// shared registry reference; every call is a pure function of its inputs
/// and the current snapshot.
pub struct MonikerService {
    registry: Arc<Registry>,
}

impl MonikerService {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a moniker string to its source descriptor.
    pub fn resolve(
        &self,
        moniker_str: &str,
        caller: &CallerIdentity,
    ) -> Result<ResolveResult, ResolveError> {
        let moniker = parse_moniker(moniker_str)?;
        let path = moniker.canonical_path();

        debug!(
            moniker = %moniker,
            user_id = %caller.user_id,
            source = %caller.source,
            "resolving moniker"
        );

        let (binding, binding_path) =
            self.registry
                .find_binding(&path)
                .ok_or_else(|| ResolveError::NotFound {
                    path: path.clone(),
                })?;

        let node = self.registry.get_or_virtual(&binding_path);

        // Deprecated nodes with a successor redirect the whole resolution.
        // A failed chase falls back to the deprecated binding itself.
        if node.status == NodeStatus::Deprecated {
            if let Some(successor) = &node.successor {
                if let Some(result) = self.chase_successor(&moniker, &path, successor) {
                    return Ok(result);
                }
            }
        }

        let mut warning = None;
        if let Some(policy) = &node.access_policy {
            let decision = policy.validate(&moniker.path.segments);
            if !decision.allowed {
                return Err(ResolveError::AccessDenied {
                    message: decision
                        .message
                        .unwrap_or_else(|| "query pattern rejected by access policy".to_string()),
                    estimated_rows: decision.estimated_rows,
                });
            }
            warning = decision.message;
        }

        Ok(self.build_result(&moniker, &path, &binding, &binding_path, &node, warning))
    }

    /// Walk the successor chain from a deprecated binding node. Returns the
    /// redirected result when a serving binding is reached within the hop
    /// bound, None otherwise.
    fn chase_successor(
        &self,
        moniker: &Moniker,
        original_path: &str,
        first_successor: &str,
    ) -> Option<ResolveResult> {
        let mut successor_path = first_successor.to_string();
        for _hop in 0..MAX_SUCCESSOR_HOPS {
            let successor = self.registry.get(&successor_path)?;
            match (successor.status == NodeStatus::Deprecated, &successor.successor) {
                (true, Some(next)) => successor_path = next.clone(),
                _ => {
                    let (binding, binding_path) = self.registry.find_binding(&successor_path)?;
                    let mut result = self.build_result(
                        moniker,
                        &successor_path,
                        &binding,
                        &binding_path,
                        &successor,
                        None,
                    );
                    result.redirected_from = Some(original_path.to_string());
                    return Some(result);
                }
            }
        }
        None
    }

    fn build_result(
        &self,
        moniker: &Moniker,
        path: &str,
        binding: &SourceBinding,
        binding_path: &str,
        node: &CatalogNode,
        warning: Option<String>,
    ) -> ResolveResult {
        let ownership = self.registry.resolve_ownership(path);

        let mut connection = binding.config.clone();
        connection.remove("query");
        let query = binding
            .query_template()
            .map(|template| render_query(template, moniker));

        let sub_path = if binding_path == path {
            None
        } else {
            path.strip_prefix(&format!("{binding_path}/"))
                .map(str::to_string)
        };

        ResolveResult {
            moniker: moniker.to_string(),
            path: path.to_string(),
            source: ResolvedSource {
                source_type: binding.source_type,
                connection,
                query,
                params: moniker.params.clone(),
                schema: binding.schema.clone(),
                read_only: binding.read_only,
            },
            ownership,
            node: node.clone(),
            binding_path: binding_path.to_string(),
            sub_path,
            warning,
            redirected_from: None,
        }
    }

    /// Metadata about a path. Never chases successors, never applies an
    /// access policy; unregistered paths come back as placeholders.
    pub fn describe(&self, path: &str) -> DescribeResult {
        let node = self.registry.get_or_virtual(path);
        let ownership = self.registry.resolve_ownership(path);
        let binding = self.registry.find_binding(path);

        DescribeResult {
            moniker: format!("moniker://{path}"),
            path: path.to_string(),
            has_source_binding: binding.is_some(),
            source_type: binding.map(|(found, _)| found.source_type),
            node,
            ownership,
        }
    }

    /// Direct children of a path, sorted for stable output within one
    /// snapshot.
    pub fn list(&self, path: &str) -> ListResult {
        ListResult {
            children: self.registry.children_paths(path),
            moniker: format!("moniker://{path}"),
            path: path.to_string(),
            ownership: self.registry.resolve_ownership(path),
        }
    }

    /// Ancestor chain root-to-self plus resolved ownership.
    pub fn lineage(&self, path: &str) -> LineageResult {
        let mut hierarchy = ancestor_paths(path);
        if !path.is_empty() {
            hierarchy.push(path.to_string());
        }
        LineageResult {
            path: path.to_string(),
            hierarchy,
            ownership: self.registry.resolve_ownership(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessPolicy, SourceType};
    use serde_json::json;

    fn binding_with_query(query: &str) -> SourceBinding {
        let mut config = serde_json::Map::new();
        config.insert("warehouse".to_string(), json!("ANALYTICS_WH"));
        config.insert("query".to_string(), json!(query));
        SourceBinding {
            source_type: SourceType::Snowflake,
            config,
            allowed_operations: Vec::new(),
            schema: None,
            read_only: true,
            cache: None,
        }
    }

    fn node(path: &str) -> CatalogNode {
        CatalogNode {
            path: path.to_string(),
            ..CatalogNode::default()
        }
    }

    fn service(nodes: Vec<CatalogNode>) -> MonikerService {
        MonikerService::new(Arc::new(Registry::from_nodes(nodes).unwrap()))
    }

    #[test]
    fn exact_binding_has_no_sub_path() {
        let svc = service(vec![CatalogNode {
            source_binding: Some(binding_with_query("SELECT 1")),
            ..node("a/b")
        }]);
        let result = svc.resolve("a/b", &CallerIdentity::anonymous()).unwrap();
        assert_eq!(result.binding_path, "a/b");
        assert!(result.sub_path.is_none());
    }

    #[test]
    fn inherited_binding_reports_sub_path() {
        let svc = service(vec![
            CatalogNode {
                source_binding: Some(binding_with_query("SELECT 1")),
                ..node("benchmarks.constituents")
            },
        ]);
        let result = svc
            .resolve("benchmarks.constituents/SP500/20260101", &CallerIdentity::anonymous())
            .unwrap();
        assert_eq!(result.binding_path, "benchmarks.constituents");
        assert_eq!(result.sub_path.as_deref(), Some("SP500/20260101"));
    }

    #[test]
    fn connection_excludes_the_query_key() {
        let svc = service(vec![CatalogNode {
            source_binding: Some(binding_with_query("SELECT 1")),
            ..node("a")
        }]);
        let result = svc.resolve("a", &CallerIdentity::anonymous()).unwrap();
        assert!(result.source.connection.contains_key("warehouse"));
        assert!(!result.source.connection.contains_key("query"));
        assert_eq!(result.source.query.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn parse_failure_surfaces_as_typed_error() {
        let svc = service(vec![]);
        let err = svc
            .resolve("http://nope/a", &CallerIdentity::anonymous())
            .unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }

    #[test]
    fn missing_binding_is_not_found() {
        let svc = service(vec![node("a")]);
        let err = svc.resolve("a/b", &CallerIdentity::anonymous()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                path: "a/b".to_string()
            }
        );
    }

    #[test]
    fn policy_warning_annotates_result() {
        let svc = service(vec![CatalogNode {
            source_binding: Some(binding_with_query("SELECT 1")),
            access_policy: Some(AccessPolicy {
                base_row_count: 500,
                max_rows_warn: Some(100),
                ..AccessPolicy::default()
            }),
            ..node("a")
        }]);
        let result = svc.resolve("a", &CallerIdentity::anonymous()).unwrap();
        assert!(result.warning.unwrap().contains("large query"));
    }

    #[test]
    fn describe_skips_successors_and_policies() {
        let svc = service(vec![CatalogNode {
            status: NodeStatus::Deprecated,
            successor: Some("b".to_string()),
            source_binding: Some(binding_with_query("SELECT 1")),
            access_policy: Some(AccessPolicy {
                blocked_patterns: vec![".*".to_string()],
                ..AccessPolicy::default()
            }),
            ..node("a")
        }]);
        let described = svc.describe("a");
        assert_eq!(described.path, "a");
        assert!(described.has_source_binding);
        assert_eq!(described.source_type, Some(SourceType::Snowflake));
    }

    #[test]
    fn lineage_runs_root_to_self() {
        let svc = service(vec![node("a"), node("a/b")]);
        let lineage = svc.lineage("a/b/c");
        assert_eq!(lineage.hierarchy, vec!["a", "a/b", "a/b/c"]);
    }
}
