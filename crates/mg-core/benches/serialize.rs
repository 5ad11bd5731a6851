//! Benchmarks for wire serialization.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mg_core::{Model, Registry, TypeDecl, Value, ValueType, serialize};

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .declare(
            TypeDecl::new("Node")
                .property("weight", ValueType::float().with_default(0.0))
                .property("shared", ValueType::nullable(ValueType::instance("Node")))
                .property("children", ValueType::list(ValueType::instance("Node"))),
        )
        .unwrap();
    registry
}

/// A root with `width` children that all point at one shared node, which
/// points back at the root.
fn wide_graph(registry: &Registry, width: usize) -> (Model, Model) {
    let root = registry.new_instance("Node").unwrap();
    let shared = registry.create("Node", [("shared", &root)]).unwrap();
    let children: Vec<Value> = (0..width)
        .map(|i| {
            let weight = f64::from(u32::try_from(i).unwrap_or(u32::MAX));
            Value::from(
                registry
                    .create("Node", [("weight", Value::from(weight)), ("shared", Value::from(&shared))])
                    .unwrap(),
            )
        })
        .collect();
    root.set("children", children).unwrap();
    (root, shared)
}

fn bench_serialize_wide(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("serialize_wide");

    for width in [16, 256, 4096] {
        let (root, shared) = wide_graph(&registry, width);
        group.throughput(Throughput::Elements(width as u64 + 2));
        group.bench_with_input(BenchmarkId::from_parameter(width), &root, |b, root| {
            b.iter(|| black_box(serialize(black_box(root)).unwrap()));
        });
        shared.unset("shared").unwrap();
    }

    group.finish();
}

criterion_group!(benches, bench_serialize_wide);
criterion_main!(benches);
