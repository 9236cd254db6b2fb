// Catalog registry - the in-memory snapshot serving all reads.
//
// Two maps make up a snapshot: nodes by path and a children index derived
// from node paths at build time. Both sit behind a single readers-writer
// lock; a hot reload builds the replacement outside the lock and swaps the
// whole snapshot in one O(1) critical section. Nothing awaits while a lock
// is held.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use thiserror::Error;

use crate::model::{AuditEntry, CatalogNode, NodeStatus, ResolvedOwnership, SourceBinding};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate catalog path '{path}'")]
    DuplicatePath { path: String },
    #[error("no node registered at '{path}'")]
    NotRegistered { path: String },
}

/// The parent of a path is the path with its last `/`- or `.`-delimited
/// segment removed, whichever separator appears last. Top-level paths have
/// the empty-string root as parent; the root itself has none. Both
/// separators may coexist in one catalog (`analytics.risk/var`), and this
/// helper is the only place that cares.
pub fn parent_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let cut = match (path.rfind('/'), path.rfind('.')) {
        (Some(slash), Some(dot)) => slash.max(dot),
        (Some(slash), None) => slash,
        (None, Some(dot)) => dot,
        (None, None) => return Some(String::new()),
    };
    Some(path[..cut].to_string())
}

/// All ancestor paths from root to parent, not including the root marker or
/// the path itself. `analytics.risk/var` -> `[analytics, analytics.risk]`.
pub fn ancestor_paths(path: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = path.to_string();
    while let Some(parent) = parent_path(&current) {
        if parent.is_empty() {
            break;
        }
        chain.push(parent.clone());
        current = parent;
    }
    chain.reverse();
    chain
}

#[derive(Default, Debug)]
struct Snapshot {
    nodes: HashMap<String, CatalogNode>,
    children: HashMap<String, BTreeSet<String>>,
}

impl Snapshot {
    fn build(nodes: Vec<CatalogNode>) -> Result<Self, RegistryError> {
        let mut snapshot = Snapshot {
            nodes: HashMap::with_capacity(nodes.len()),
            children: HashMap::new(),
        };
        for node in nodes {
            let path = node.path.clone();
            if snapshot.nodes.insert(path.clone(), node).is_some() {
                return Err(RegistryError::DuplicatePath { path });
            }
            if let Some(parent) = parent_path(&path) {
                snapshot.children.entry(parent).or_default().insert(path);
            }
        }
        Ok(snapshot)
    }
}

/// Thread-safe registry of catalog nodes. Read-heavy: every resolution
/// takes the read lock for the duration of its lookups; only the hot
/// reloader and the administrative status update ever take the write lock.
#[derive(Debug)]
pub struct Registry {
    snapshot: RwLock<Snapshot>,
    audit: RwLock<Vec<AuditEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::default()),
            audit: RwLock::new(Vec::new()),
        }
    }

    pub fn from_nodes(nodes: Vec<CatalogNode>) -> Result<Self, RegistryError> {
        Ok(Self {
            snapshot: RwLock::new(Snapshot::build(nodes)?),
            audit: RwLock::new(Vec::new()),
        })
    }

    /// Atomically replace the whole snapshot. The replacement maps are
    /// built before the write lock is taken, so the critical section is a
    /// pointer swap and readers observe either the old or the new snapshot,
    /// never a mix. The audit log survives swaps.
    pub fn atomic_replace(&self, nodes: Vec<CatalogNode>) -> Result<usize, RegistryError> {
        let replacement = Snapshot::build(nodes)?;
        let count = replacement.nodes.len();
        let mut guard = self.snapshot.write().expect("registry lock poisoned");
        *guard = replacement;
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().expect("registry lock poisoned").nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, path: &str) -> Option<CatalogNode> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        guard.nodes.get(path).cloned()
    }

    /// The registered node, or a synthesized placeholder for paths without
    /// one. Placeholders are never added to the registry.
    pub fn get_or_virtual(&self, path: &str) -> CatalogNode {
        self.get(path)
            .unwrap_or_else(|| CatalogNode::placeholder(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        guard.nodes.contains_key(path)
    }

    /// Paths of direct children, sorted.
    pub fn children_paths(&self, path: &str) -> Vec<String> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        guard
            .children
            .get(path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Direct child nodes, sorted by path.
    pub fn children(&self, path: &str) -> Vec<CatalogNode> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        guard
            .children
            .get(path)
            .map(|set| {
                set.iter()
                    .filter_map(|child| guard.nodes.get(child).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All registered paths, sorted.
    pub fn all_paths(&self) -> Vec<String> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        let mut paths: Vec<String> = guard.nodes.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Effective ownership for a path. Walks the ancestor chain from the
    /// root down to the path itself; each field inherits independently from
    /// the nearest ancestor that defines it, and the result records the
    /// defining path per field. Output depends only on the snapshot
    /// contents, not on registration order.
    pub fn resolve_ownership(&self, path: &str) -> ResolvedOwnership {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        let mut resolved = ResolvedOwnership::default();
        let chain = ancestor_paths(path)
            .into_iter()
            .chain(std::iter::once(path.to_string()));
        for ancestor in chain {
            if let Some(ownership) = guard
                .nodes
                .get(&ancestor)
                .and_then(|node| node.ownership.as_ref())
            {
                resolved.apply(&ancestor, ownership);
            }
        }
        resolved
    }

    /// The source binding serving a path, and the path it was found at.
    /// Checks the exact node first, then walks ancestors nearest to
    /// farthest. Nodes in archived, draft, or pending_review never serve
    /// their binding.
    pub fn find_binding(&self, path: &str) -> Option<(SourceBinding, String)> {
        let guard = self.snapshot.read().expect("registry lock poisoned");

        let serving = |candidate: &str| -> Option<(SourceBinding, String)> {
            let node = guard.nodes.get(candidate)?;
            if !node.status.serves_bindings() {
                return None;
            }
            node.source_binding
                .as_ref()
                .map(|binding| (binding.clone(), candidate.to_string()))
        };

        if let Some(found) = serving(path) {
            return Some(found);
        }
        ancestor_paths(path)
            .iter()
            .rev()
            .find_map(|ancestor| serving(ancestor))
    }

    /// Case-insensitive substring search over path, display name,
    /// description, and tags. Results come back in path order.
    pub fn search(
        &self,
        query: &str,
        status: Option<NodeStatus>,
        limit: usize,
    ) -> Vec<CatalogNode> {
        let needle = query.to_lowercase();
        let guard = self.snapshot.read().expect("registry lock poisoned");

        let mut paths: Vec<&String> = guard.nodes.keys().collect();
        paths.sort();

        let mut results = Vec::new();
        for path in paths {
            if results.len() >= limit {
                break;
            }
            let node = &guard.nodes[path];
            if let Some(status) = status {
                if node.status != status {
                    continue;
                }
            }
            let matched = node.path.to_lowercase().contains(&needle)
                || node.display_name.to_lowercase().contains(&needle)
                || node.description.to_lowercase().contains(&needle)
                || node
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle));
            if matched {
                results.push(node.clone());
            }
        }
        results
    }

    pub fn find_by_status(&self, status: NodeStatus) -> Vec<CatalogNode> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        let mut nodes: Vec<CatalogNode> = guard
            .nodes
            .values()
            .filter(|node| node.status == status)
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes
    }

    /// Node counts keyed by status, plus a `total` entry.
    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        let mut counts = BTreeMap::new();
        for node in guard.nodes.values() {
            *counts.entry(node.status.as_str().to_string()).or_insert(0) += 1;
        }
        counts.insert("total".to_string(), guard.nodes.len());
        counts
    }

    /// Bound-node counts keyed by source type.
    pub fn source_type_counts(&self) -> BTreeMap<String, usize> {
        let guard = self.snapshot.read().expect("registry lock poisoned");
        let mut counts = BTreeMap::new();
        for node in guard.nodes.values() {
            if let Some(binding) = &node.source_binding {
                *counts
                    .entry(binding.source_type.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }
        counts
    }

    /// Best-effort live status change on the current snapshot. The change
    /// is audited but not persisted: the next reload rebuilds the snapshot
    /// from the declarative source and discards it.
    pub fn update_status(
        &self,
        path: &str,
        status: NodeStatus,
        actor: &str,
    ) -> Result<NodeStatus, RegistryError> {
        let old_status = {
            let mut guard = self.snapshot.write().expect("registry lock poisoned");
            let node = guard
                .nodes
                .get_mut(path)
                .ok_or_else(|| RegistryError::NotRegistered {
                    path: path.to_string(),
                })?;
            let old_status = node.status;
            node.status = status;
            old_status
        };
        self.audit
            .write()
            .expect("audit lock poisoned")
            .push(AuditEntry::status_changed(
                path,
                actor,
                old_status.as_str(),
                status.as_str(),
            ));
        Ok(old_status)
    }

    /// Audit entries recorded for a path; empty when nothing changed.
    pub fn audit_entries(&self, path: &str) -> Vec<AuditEntry> {
        self.audit
            .read()
            .expect("audit lock poisoned")
            .iter()
            .filter(|entry| entry.path == path)
            .cloned()
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ownership, SourceType};

    fn node(path: &str) -> CatalogNode {
        CatalogNode {
            path: path.to_string(),
            ..CatalogNode::default()
        }
    }

    fn bound_node(path: &str, status: NodeStatus) -> CatalogNode {
        CatalogNode {
            path: path.to_string(),
            status,
            source_binding: Some(SourceBinding {
                source_type: SourceType::Snowflake,
                config: serde_json::Map::new(),
                allowed_operations: Vec::new(),
                schema: None,
                read_only: true,
                cache: None,
            }),
            ..CatalogNode::default()
        }
    }

    #[test]
    fn parent_uses_last_separator() {
        assert_eq!(parent_path("a/b/c").as_deref(), Some("a/b"));
        assert_eq!(parent_path("a.b.c").as_deref(), Some("a.b"));
        assert_eq!(parent_path("analytics.risk/var").as_deref(), Some("analytics.risk"));
        assert_eq!(parent_path("a/b.c").as_deref(), Some("a/b"));
        assert_eq!(parent_path("top").as_deref(), Some(""));
        assert_eq!(parent_path(""), None);
    }

    #[test]
    fn ancestors_run_root_to_parent() {
        assert_eq!(
            ancestor_paths("analytics.risk/var"),
            vec!["analytics", "analytics.risk"]
        );
        assert!(ancestor_paths("top").is_empty());
        assert!(ancestor_paths("").is_empty());
    }

    #[test]
    fn children_index_contains_every_node() {
        let registry =
            Registry::from_nodes(vec![node("a"), node("a/b"), node("a/b/c"), node("a/d")])
                .unwrap();
        assert_eq!(registry.children_paths("a"), vec!["a/b", "a/d"]);
        assert_eq!(registry.children_paths("a/b"), vec!["a/b/c"]);
        assert_eq!(registry.children_paths(""), vec!["a"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = Registry::from_nodes(vec![node("a"), node("a")]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePath {
                path: "a".to_string()
            }
        );
    }

    #[test]
    fn virtual_lookup_synthesizes_a_placeholder() {
        let registry = Registry::from_nodes(vec![node("a")]).unwrap();
        let virtual_node = registry.get_or_virtual("a/ghost");
        assert_eq!(virtual_node.path, "a/ghost");
        assert!(!virtual_node.is_leaf);
        assert!(registry.get("a/ghost").is_none());
    }

    #[test]
    fn ownership_is_independent_of_registration_order() {
        let parent = CatalogNode {
            ownership: Some(Ownership {
                accountable_owner: Some("a@x".into()),
                ..Ownership::default()
            }),
            ..node("benchmarks")
        };
        let child = CatalogNode {
            ownership: Some(Ownership {
                data_specialist: Some("b@x".into()),
                ..Ownership::default()
            }),
            ..node("benchmarks/constituents")
        };

        let forward = Registry::from_nodes(vec![parent.clone(), child.clone()]).unwrap();
        let reverse = Registry::from_nodes(vec![child, parent]).unwrap();
        assert_eq!(
            forward.resolve_ownership("benchmarks/constituents/SP500"),
            reverse.resolve_ownership("benchmarks/constituents/SP500")
        );
    }

    #[test]
    fn binding_walks_to_nearest_serving_ancestor() {
        let registry = Registry::from_nodes(vec![
            bound_node("a", NodeStatus::Active),
            bound_node("a/b", NodeStatus::Draft),
            node("a/b/c"),
        ])
        .unwrap();
        // a/b is draft, so its binding is skipped and a serves.
        let (_, binding_path) = registry.find_binding("a/b/c").unwrap();
        assert_eq!(binding_path, "a");
    }

    #[test]
    fn archived_exact_node_falls_through_to_ancestor() {
        let registry = Registry::from_nodes(vec![
            bound_node("a", NodeStatus::Active),
            bound_node("a/b", NodeStatus::Archived),
        ])
        .unwrap();
        let (_, binding_path) = registry.find_binding("a/b").unwrap();
        assert_eq!(binding_path, "a");
    }

    #[test]
    fn no_serving_binding_yields_none() {
        let registry =
            Registry::from_nodes(vec![bound_node("a", NodeStatus::Archived), node("a/b")])
                .unwrap();
        assert!(registry.find_binding("a/b").is_none());
    }

    #[test]
    fn atomic_replace_swaps_the_whole_tree() {
        let registry = Registry::from_nodes(vec![node("old"), node("old/leaf")]).unwrap();
        registry.atomic_replace(vec![node("new")]).unwrap();
        assert!(registry.get("old").is_none());
        assert!(registry.get("old/leaf").is_none());
        assert!(registry.get("new").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn status_update_is_audited() {
        let registry = Registry::from_nodes(vec![node("a")]).unwrap();
        let old = registry
            .update_status("a", NodeStatus::Deprecated, "ops@x")
            .unwrap();
        assert_eq!(old, NodeStatus::Active);
        assert_eq!(registry.get("a").unwrap().status, NodeStatus::Deprecated);

        let entries = registry.audit_entries("a");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor, "ops@x");
        assert_eq!(entries[0].old_value.as_deref(), Some("active"));
        assert_eq!(entries[0].new_value.as_deref(), Some("deprecated"));
        assert!(registry.audit_entries("b").is_empty());
    }

    #[test]
    fn audit_log_survives_snapshot_swap() {
        let registry = Registry::from_nodes(vec![node("a")]).unwrap();
        registry
            .update_status("a", NodeStatus::Archived, "ops@x")
            .unwrap();
        registry.atomic_replace(vec![node("a")]).unwrap();
        assert_eq!(registry.audit_entries("a").len(), 1);
        // The swap also reverts the live mutation.
        assert_eq!(registry.get("a").unwrap().status, NodeStatus::Active);
    }

    #[test]
    fn search_covers_tags_and_is_bounded() {
        let tagged = CatalogNode {
            tags: vec!["benchmark".into(), "equity".into()],
            ..node("z/constituents")
        };
        let named = CatalogNode {
            display_name: "Equity Benchmarks".into(),
            ..node("a/bench")
        };
        let registry = Registry::from_nodes(vec![tagged, named, node("m/other")]).unwrap();

        let hits = registry.search("equity", None, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].path, "a/bench");

        assert_eq!(registry.search("equity", None, 1).len(), 1);
        assert!(registry.search("nothing-here", None, 10).is_empty());
    }

    #[test]
    fn counts_by_status_and_source_type() {
        let registry = Registry::from_nodes(vec![
            bound_node("a", NodeStatus::Active),
            bound_node("b", NodeStatus::Deprecated),
            node("c"),
        ])
        .unwrap();

        let by_status = registry.status_counts();
        assert_eq!(by_status.get("active"), Some(&2));
        assert_eq!(by_status.get("deprecated"), Some(&1));
        assert_eq!(by_status.get("total"), Some(&3));

        assert_eq!(registry.source_type_counts().get("snowflake"), Some(&2));
    }
}
