//! 短码生成与 URL 规范化基准测试

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kurz::services::{AliasGenerator, LinkStore};
use kurz::store::MemoryStore;
use kurz::utils::url_validator::normalize_url;
use kurz::utils::{generate_random_code, is_valid_alias};

// ============== generate_random_code 基准测试 ==============

fn bench_generate_random_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/generate_random_code");

    for length in [5usize, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &len| {
            b.iter(|| generate_random_code(black_box(len)));
        });
    }

    group.finish();
}

fn bench_is_valid_alias(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/is_valid_alias");

    group.bench_function("valid", |b| {
        b.iter(|| assert!(is_valid_alias(black_box("aB3dE"))));
    });

    group.bench_function("invalid_static_path", |b| {
        b.iter(|| assert!(!is_valid_alias(black_box("css/site.css"))));
    });

    group.finish();
}

// ============== 预留短码（MemoryStore） ==============

fn bench_reserve_alias(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("alias/generate");

    // 每次迭代都会占用一个短码，存储随迭代增长
    let links = LinkStore::new(Arc::new(MemoryStore::new()), "http://localhost");
    let generator = AliasGenerator::new(5, 10);
    group.bench_function("length_5", |b| {
        b.to_async(&rt)
            .iter(|| async { generator.generate(&links).await.unwrap() });
    });

    group.finish();
}

// ============== normalize_url 基准测试 ==============

fn bench_normalize_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/normalize_url");

    group.bench_function("bare_host_path", |b| {
        b.iter(|| normalize_url(black_box("example.com/a"), "http").unwrap());
    });

    group.bench_function("full_url_with_query", |b| {
        b.iter(|| {
            normalize_url(
                black_box("https://example.com/search?q=rust&page=2#top"),
                "http",
            )
            .unwrap()
        });
    });

    group.bench_function("dangerous", |b| {
        b.iter(|| normalize_url(black_box("javascript:alert(1)"), "http").is_err());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_generate_random_code,
    bench_is_valid_alias,
    bench_reserve_alias,
    bench_normalize_url
);
criterion_main!(benches);
