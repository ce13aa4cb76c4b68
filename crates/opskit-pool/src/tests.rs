//! Behavioural tests for the pool: completion counting, error collection,
//! and the concurrency bound under different capacities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::WorkerPool;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_all_jobs_complete() {
    for n in [5usize, 15, 30] {
        let pool = WorkerPool::new(3);
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..n {
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
        assert_eq!(count.load(Ordering::SeqCst), n);
        assert!(pool.errors().await.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sync_errors_collected() {
    let pool = WorkerPool::new(3);

    for _ in 0..10 {
        pool.submit(|_done| Err(anyhow::anyhow!("big error"))).await;
    }

    let errors = pool.errors().await;
    assert_eq!(errors.len(), 10);
    for err in &errors {
        assert_eq!(err.to_string(), "big error");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_errors_collected() {
    let pool = WorkerPool::new(3);

    for _ in 0..10 {
        pool.submit(|done| {
            tokio::spawn(async move {
                done.done(Some(anyhow::anyhow!("big error")));
            });
            Ok(())
        })
        .await;
    }

    let errors = pool.errors().await;
    assert_eq!(errors.len(), 10);
    for err in &errors {
        assert_eq!(err.to_string(), "big error");
    }
}

async fn timed_sleep_jobs(capacity: usize, jobs: usize) -> Duration {
    let pool = WorkerPool::new(capacity);
    let start = Instant::now();

    for _ in 0..jobs {
        pool.submit(|done| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                done.done(None);
            });
            Ok(())
        })
        .await;
    }

    pool.wait().await;
    start.elapsed()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_one_serializes() {
    for n in [1u32, 2, 3] {
        let elapsed = timed_sleep_jobs(1, n as usize).await;
        let floor = Duration::from_millis(u64::from(n) * 100);
        let ceil = Duration::from_millis(u64::from(n + 1) * 100);

        assert!(elapsed >= floor, "n={n}: finished too fast: {elapsed:?}");
        assert!(elapsed <= ceil, "n={n}: finished too slow: {elapsed:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_two_overlaps() {
    for n in [2u32, 4, 6] {
        let elapsed = timed_sleep_jobs(2, n as usize).await;
        let floor = Duration::from_millis(u64::from(n) * 50);
        let ceil = Duration::from_millis(u64::from(n + 2) * 50);

        assert!(elapsed >= floor, "n={n}: finished too fast: {elapsed:?}");
        assert!(elapsed <= ceil, "n={n}: finished too slow: {elapsed:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_three_overlaps() {
    for n in [3u32, 6, 9] {
        let elapsed = timed_sleep_jobs(3, n as usize).await;
        let floor = Duration::from_millis(u64::from(n) * 33);
        let ceil = Duration::from_millis(u64::from(n + 3) * 33);

        assert!(elapsed >= floor, "n={n}: finished too fast: {elapsed:?}");
        assert!(elapsed <= ceil, "n={n}: finished too slow: {elapsed:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_is_idempotent() {
    let pool = WorkerPool::new(2);
    pool.close();
    pool.close();
    pool.wait().await;
    assert!(pool.errors().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_completions_after_close_are_ignored() {
    let pool = WorkerPool::new(3);

    for _ in 0..3 {
        pool.submit(|done| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                done.done(Some(anyhow::anyhow!("late error")));
            });
            Ok(())
        })
        .await;
    }

    // Close while all three jobs are still running; their completions must
    // still unblock wait() but record nothing
    pool.close();
    pool.wait().await;

    assert!(pool.errors().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_completion_is_one_shot() {
    let pool = WorkerPool::new(1);

    pool.submit(|done| {
        tokio::spawn(async move {
            done.done(Some(anyhow::anyhow!("first")));
            done.done(Some(anyhow::anyhow!("second")));
        });
        Ok(())
    })
    .await;

    let errors = pool.errors().await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "first");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_errors_drain_once() {
    let pool = WorkerPool::new(1);
    pool.submit(|_done| Err(anyhow::anyhow!("big error"))).await;

    assert_eq!(pool.errors().await.len(), 1);
    assert!(pool.errors().await.is_empty());
}
