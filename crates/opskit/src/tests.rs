//! Cross-component integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_jobs_share_one_generation() {
    // Many pool jobs asking the cache for the same key coalesce onto a
    // single generator invocation
    let cache: Cache<String> = Cache::with_defaults();
    let pool = WorkerPool::new(4);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..12 {
        let cache = cache.clone();
        let calls = calls.clone();

        pool.submit(move |done| {
            tokio::spawn(async move {
                let result = cache
                    .get("upstream", move || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            Ok("payload".to_string())
                        }
                    })
                    .await;

                match result {
                    Ok(value) => {
                        assert_eq!(value, "payload");
                        done.done(None);
                    }
                    Err(err) => done.done(Some(anyhow::anyhow!(err))),
                }
            });
            Ok(())
        })
        .await;
    }

    pool.wait().await;
    assert!(pool.errors().await.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_generator_errors_surface_through_pool() {
    let cache: Cache<String> = Cache::new(CacheConfig {
        default_ttl: Duration::ZERO,
        default_grace: Duration::ZERO,
        ..Default::default()
    });
    let pool = WorkerPool::new(1);

    for _ in 0..3 {
        let cache = cache.clone();

        pool.submit(move |done| {
            tokio::spawn(async move {
                let result = cache
                    .get("broken", || async { Err(CacheError::generator("oops")) })
                    .await;

                match result {
                    Ok(_) => done.done(None),
                    Err(err) => done.done(Some(anyhow::anyhow!(err))),
                }
            });
            Ok(())
        })
        .await;
    }

    let errors = pool.errors().await;
    assert_eq!(errors.len(), 3);
    for err in &errors {
        assert_eq!(err.to_string(), "oops");
    }
}

#[tokio::test]
async fn test_set_then_get_roundtrip() {
    let cache: Cache<Vec<String>> = Cache::with_defaults();

    let prefixes = vec!["192.0.2.0/24".to_string(), "198.51.100.0/24".to_string()];
    cache.set("AS64500", prefixes.clone()).await;

    let cached = cache
        .get("AS64500", || async { Ok(Vec::new()) })
        .await
        .unwrap();
    assert_eq!(cached, prefixes);
}
