//! Benchmarks for the type inference cascade and record validation
//!
//! Run with: `cargo bench -p docmodel-core`
//!
//! Strings that fall through to the end of the cascade (postal codes, plain
//! text) are the worst case: every format predicate runs before them.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docmodel_core::behaviors::HookRegistry;
use docmodel_core::models::{DataType, FieldDescriptor, Record, SchemaTree};
use docmodel_core::services::{infer_type, validate_record};
use serde_json::{json, Value};
use tokio::runtime::Runtime;

fn bench_infer_type(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer_type");

    let samples: Vec<(&str, Value)> = vec![
        ("date", json!("2024-03-01T10:15:30Z")),
        ("email", json!("abbeya1@yahoo.com")),
        ("uuid", json!("550e8400-e29b-41d4-a716-446655440000")),
        ("url", json!("https://mconnect.biz/docs")),
        ("postal_code", json!("SW1A 1AA")),
        ("plain_text", json!("The quick brown fox jumps over the lazy dog")),
        ("decimal", json!(3.25)),
        ("array_of_string", json!(["a", "b", "c", "d"])),
    ];

    for (name, value) in &samples {
        group.bench_function(*name, |b| b.iter(|| infer_type(black_box(value))));
    }

    group.finish();
}

fn bench_validate_record(c: &mut Criterion) {
    let runtime = Runtime::new().expect("failed to create runtime");
    let hooks = HookRegistry::new();
    let schema = SchemaTree::new()
        .field("username", FieldDescriptor::new(DataType::String).min_value(6.0).required())
        .primitive("email", DataType::Email)
        .primitive("website", DataType::Url)
        .nested(
            "profile",
            SchemaTree::new()
                .field("firstName", FieldDescriptor::new(DataType::String).field_length(255))
                .field("age", FieldDescriptor::new(DataType::Integer).min_value(0.0).max_value(150.0)),
        );
    let record: Record = json!({
        "username": "abbeyma",
        "email": "abbeya1@yahoo.com",
        "website": "https://mconnect.biz",
        "profile": { "firstName": "Abi", "age": 30 }
    })
    .as_object()
    .cloned()
    .unwrap_or_default();

    c.bench_function("validate_record", |b| {
        b.iter(|| runtime.block_on(validate_record(black_box(&record), &schema, &hooks, "create")))
    });
}

criterion_group!(benches, bench_infer_type, bench_validate_record);
criterion_main!(benches);
