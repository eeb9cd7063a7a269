//! Benchmarks for markdown parsing.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pagemark::document::parse;

fn bench_parse_simple(c: &mut Criterion) {
    let md = "# Hello\n\nWorld";
    c.bench_function("parse_simple", |b| b.iter(|| parse(black_box(md))));
}

fn bench_parse_medium(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/sample.md");
    c.bench_function("parse_medium", |b| b.iter(|| parse(black_box(md))));
}

criterion_group!(benches, bench_parse_simple, bench_parse_medium);
criterion_main!(benches);
