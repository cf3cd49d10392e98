// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Evaluation-path benchmarks.
//!
//! Measures per-sample cost of `ContentFilter::evaluate` over pre-encoded
//! payloads: simple predicate, compound short-circuit, LIKE, and a nested
//! field path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ddsql::dynamic::{
    encode_sample, DynamicData, DynamicValue, PrimitiveKind, TypeDescriptor,
    TypeDescriptorBuilder,
};
use ddsql::filter::ContentFilter;
use std::sync::Arc;

fn bench_type() -> Arc<TypeDescriptor> {
    let inner = Arc::new(
        TypeDescriptorBuilder::new("Position")
            .field("x", PrimitiveKind::F64)
            .field("y", PrimitiveKind::F64)
            .build(),
    );
    Arc::new(
        TypeDescriptorBuilder::new("Track")
            .field("id", PrimitiveKind::U32)
            .field("priority", PrimitiveKind::I32)
            .string_field("label")
            .nested_field("position", inner)
            .build(),
    )
}

fn payload(id: u32, priority: i32, label: &str, x: f64, y: f64) -> Vec<u8> {
    let descriptor = bench_type();
    let mut data = DynamicData::new(&descriptor);
    data.set("id", id).unwrap();
    data.set("priority", priority).unwrap();
    data.set("label", label).unwrap();
    data.set(
        "position",
        DynamicValue::Struct(vec![DynamicValue::F64(x), DynamicValue::F64(y)]),
    )
    .unwrap();
    encode_sample(&data).unwrap()
}

fn evaluate_simple(c: &mut Criterion) {
    let descriptor = bench_type();
    let mut filter = ContentFilter::new("priority > 5", &descriptor).unwrap();
    let sample = payload(1, 9, "track-a", 1.0, 2.0);

    c.bench_function("evaluate_simple_predicate", |b| {
        b.iter(|| black_box(filter.evaluate(black_box(&sample))))
    });
}

fn evaluate_short_circuit(c: &mut Criterion) {
    let descriptor = bench_type();
    // First conjunct fails, remaining fields are never walked.
    let mut filter =
        ContentFilter::new("priority > 100 AND label LIKE 'track%' AND position.x < 50.0", &descriptor)
            .unwrap();
    let sample = payload(1, 9, "track-a", 1.0, 2.0);

    c.bench_function("evaluate_short_circuit", |b| {
        b.iter(|| black_box(filter.evaluate(black_box(&sample))))
    });
}

fn evaluate_like(c: &mut Criterion) {
    let descriptor = bench_type();
    let mut filter = ContentFilter::new("label LIKE 'track%'", &descriptor).unwrap();
    let sample = payload(1, 9, "track-a", 1.0, 2.0);

    c.bench_function("evaluate_like", |b| {
        b.iter(|| black_box(filter.evaluate(black_box(&sample))))
    });
}

fn evaluate_nested_path(c: &mut Criterion) {
    let descriptor = bench_type();
    let mut filter =
        ContentFilter::new("position.x > 0.0 AND position.y > 0.0", &descriptor).unwrap();
    let sample = payload(1, 9, "track-a", 1.0, 2.0);

    c.bench_function("evaluate_nested_path", |b| {
        b.iter(|| black_box(filter.evaluate(black_box(&sample))))
    });
}

criterion_group!(
    benches,
    evaluate_simple,
    evaluate_short_circuit,
    evaluate_like,
    evaluate_nested_path
);
criterion_main!(benches);
