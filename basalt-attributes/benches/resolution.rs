#![allow(missing_docs)]
//! Benchmarks for attribute resolution.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use basalt_attributes::{AdderMap, AttributeSourceType};
use basalt_hierarchy::{ClassId, ClassKind, ClassTree};

const CHAIN_DEPTH: u32 = 16;

/// Builds a linear class chain with the root as the attribute base class.
/// Returns the tree, the base class, and the deepest leaf.
fn deep_tree() -> (Arc<ClassTree>, ClassId, ClassId) {
    let mut tree = ClassTree::new();
    let base = tree.register("Base", ClassKind::Abstract, None, &[]);
    let mut current = tree.register("Mid0", ClassKind::Abstract, Some(base), &[]);
    for depth in 1..CHAIN_DEPTH {
        let name: &'static str = Box::leak(format!("Mid{depth}").into_boxed_str());
        current = tree.register(name, ClassKind::Abstract, Some(current), &[]);
    }
    let leaf = tree.register("Leaf", ClassKind::Concrete, Some(current), &[]);
    (Arc::new(tree), base, leaf)
}

fn populated_map(
    tree: &Arc<ClassTree>,
    base: ClassId,
    near_base: ClassId,
) -> AdderMap<u32, &'static str> {
    let mut map = AdderMap::new("bench_attribute", base, tree.clone(), "absent");
    for key in 0..64u32 {
        map.register_exact(AttributeSourceType::Instance, key, "exact");
    }
    // The inherit mapping sits near the top of the chain, so a cold lookup
    // walks most of the ancestor list.
    map.register_class(AttributeSourceType::Instance, near_base, true, "inherited")
        .expect("valid class registration");
    for i in 0..16u32 {
        map.register_general_predicate(
            AttributeSourceType::CompatWrapper,
            move |key| *key == 100_000 + i,
            "predicate",
        );
    }
    map
}

fn near_base_class(tree: &ClassTree) -> ClassId {
    tree.class_named("Mid0").expect("chain is registered")
}

fn bench_cached_hit(c: &mut Criterion) {
    let (tree, base, leaf) = deep_tree();
    let mut map = populated_map(&tree, base, near_base_class(&tree));
    // Warm both caches.
    map.resolve(&1, leaf);
    map.resolve(&1_000, leaf);

    c.bench_function("resolve_cached_exact", |b| {
        b.iter(|| black_box(map.resolve(black_box(&1), black_box(leaf))));
    });
    c.bench_function("resolve_cached_class", |b| {
        b.iter(|| black_box(map.resolve(black_box(&1_000), black_box(leaf))));
    });
}

fn bench_cold_resolution(c: &mut Criterion) {
    let (tree, base, leaf) = deep_tree();
    let near_base = near_base_class(&tree);

    c.bench_function("resolve_cold_hierarchy_walk", |b| {
        b.iter_batched_ref(
            || populated_map(&tree, base, near_base),
            |map| black_box(map.resolve(&1_000, leaf)),
            BatchSize::SmallInput,
        );
    });
    c.bench_function("resolve_cold_predicate_scan", |b| {
        b.iter_batched_ref(
            || {
                let mut map = AdderMap::new("bench_predicates", base, tree.clone(), "absent");
                for i in 0..64u32 {
                    map.register_specific_predicate(
                        AttributeSourceType::Instance,
                        move |key| *key == i,
                        "predicate",
                    );
                }
                map
            },
            |map| black_box(map.resolve(&63, leaf)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_cached_hit, bench_cold_resolution);
criterion_main!(benches);
