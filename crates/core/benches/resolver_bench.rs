// Resolution hot-path benchmarks: parse, binding discovery with the
// ancestor walk, and the full resolve pipeline.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use moniker_core::model::{CatalogNode, Ownership, SourceBinding, SourceType};
use moniker_core::moniker::parse_moniker;
use moniker_core::resolver::CallerIdentity;
use moniker_core::{MonikerService, Registry};
use serde_json::json;

fn build_registry() -> Registry {
    let mut nodes = Vec::new();
    for domain in 0..20 {
        let root = format!("domain{domain}");
        nodes.push(CatalogNode {
            path: root.clone(),
            ownership: Some(Ownership {
                accountable_owner: Some(format!("owner{domain}@x")),
                ..Ownership::default()
            }),
            ..CatalogNode::default()
        });
        for table in 0..25 {
            let mut config = serde_json::Map::new();
            config.insert("warehouse".to_string(), json!("WH"));
            config.insert(
                "query".to_string(),
                json!("SELECT * FROM t WHERE a = '{segments[1]}' AND b = '{segments[2]}'"),
            );
            nodes.push(CatalogNode {
                path: format!("{root}/table{table}"),
                is_leaf: true,
                source_binding: Some(SourceBinding {
                    source_type: SourceType::Snowflake,
                    config,
                    allowed_operations: Vec::new(),
                    schema: None,
                    read_only: true,
                    cache: None,
                }),
                ..CatalogNode::default()
            });
        }
    }
    Registry::from_nodes(nodes).expect("bench registry builds")
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_moniker", |b| {
        b.iter(|| parse_moniker(black_box("domain7/table12/KEY@20260115/v2?format=json")))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let service = MonikerService::new(Arc::new(build_registry()));
    let caller = CallerIdentity::anonymous();
    c.bench_function("resolve_inherited_binding", |b| {
        b.iter(|| service.resolve(black_box("domain7/table12/KEY/20260115"), &caller))
    });
}

fn bench_ownership(c: &mut Criterion) {
    let registry = build_registry();
    c.bench_function("resolve_ownership", |b| {
        b.iter(|| registry.resolve_ownership(black_box("domain7/table12/KEY")))
    });
}

criterion_group!(benches, bench_parse, bench_resolve, bench_ownership);
criterion_main!(benches);
