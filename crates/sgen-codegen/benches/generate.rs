//! Generation Benchmarks
//!
//! Measures the full pipeline (load, normalize, resolve, build, emit) over
//! synthetic schemas of increasing size.
//!
//! # Schema Shapes
//!
//! - **Flat**: one definition per type, scalar members only
//! - **Hierarchy**: a discriminated base with one derived type per value

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use sgen_codegen::Generator;
use sgen_core::{GeneratorSettings, SerializerLibraries};
use sgen_schema::SchemaGraph;
use std::hint::black_box;

// ============================================================================
// Schema builders
// ============================================================================

fn flat_schema(types: usize) -> Value {
    let mut definitions = Map::new();
    let mut properties = Map::new();
    for i in 0..types {
        let name = format!("Type{i}");
        definitions.insert(
            name.clone(),
            json!({
                "type": "object",
                "description": format!("Generated type {i}"),
                "properties": {
                    "name": { "type": "string", "default": "unnamed" },
                    "count": { "type": "integer", "format": "int64" },
                    "ratio": { "type": ["number", "null"] },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "state": { "type": "string", "enum": ["idle", "running", "done"] }
                },
                "required": ["name"]
            }),
        );
        properties.insert(
            format!("field_{i}"),
            json!({ "$ref": format!("#/definitions/{name}") }),
        );
    }
    json!({
        "title": "Container",
        "type": "object",
        "properties": properties,
        "definitions": definitions
    })
}

fn hierarchy_schema(types: usize) -> Value {
    let mut definitions = Map::new();
    let mut one_of = Vec::new();
    for i in 0..types {
        let name = format!("Derived{i}");
        definitions.insert(
            name.clone(),
            json!({
                "type": "object",
                "properties": {
                    "kind": { "enum": [name.clone()] },
                    "value": { "type": "number" }
                },
                "required": ["kind"]
            }),
        );
        one_of.push(json!({ "$ref": format!("#/definitions/{name}") }));
    }
    definitions.insert(
        "Base".to_string(),
        json!({ "discriminator": { "propertyName": "kind" }, "oneOf": one_of }),
    );
    json!({
        "title": "Container",
        "type": "object",
        "properties": {
            "items": { "type": "array", "items": { "$ref": "#/definitions/Base" } }
        },
        "definitions": definitions
    })
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_generate(c: &mut Criterion, group_name: &str, build: fn(usize) -> Value) {
    let generator = Generator::new(GeneratorSettings::new(
        "Bench",
        SerializerLibraries::ALL,
    ));
    let mut group = c.benchmark_group(group_name);

    for types in [10usize, 100, 500] {
        let document = build(types);
        group.throughput(Throughput::Elements(types as u64));
        group.bench_with_input(BenchmarkId::from_parameter(types), &document, |b, document| {
            b.iter(|| {
                let graph = SchemaGraph::from_value(black_box(document.clone())).unwrap();
                let generated = generator.generate(graph, "Container").unwrap();
                black_box(generated.code.len())
            })
        });
    }

    group.finish();
}

fn bench_flat(c: &mut Criterion) {
    bench_generate(c, "generate_flat", flat_schema);
}

fn bench_hierarchy(c: &mut Criterion) {
    bench_generate(c, "generate_hierarchy", hierarchy_schema);
}

criterion_group!(benches, bench_flat, bench_hierarchy);
criterion_main!(benches);
