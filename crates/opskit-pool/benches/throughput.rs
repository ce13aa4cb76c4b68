use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use opskit_pool::WorkerPool;

fn bench_submit_wait(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    c.bench_function("submit_wait_100", |b| {
        b.to_async(&rt).iter(|| async {
            let pool = WorkerPool::new(10);
            let count = Arc::new(AtomicUsize::new(0));

            for _ in 0..100 {
                let count = count.clone();
                pool.submit(move |done| {
                    tokio::spawn(async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        done.done(None);
                    });
                    Ok(())
                })
                .await;
            }

            pool.wait().await;
            assert_eq!(count.load(Ordering::SeqCst), 100);
        })
    });
}

criterion_group!(benches, bench_submit_wait);
criterion_main!(benches);
