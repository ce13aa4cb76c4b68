use criterion::{criterion_group, criterion_main, Criterion};
use opskit_cache::Cache;

fn bench_hot_get(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    let cache: Cache<Vec<u8>> = Cache::with_defaults();

    c.bench_function("hot_get", |b| {
        b.to_async(&rt).iter(|| {
            let cache = cache.clone();
            async move {
                cache
                    .get("bench", || async { Ok(b"ok".to_vec()) })
                    .await
                    .unwrap()
            }
        })
    });
}

criterion_group!(benches, bench_hot_get);
criterion_main!(benches);
