//! Worker pool demo: ten jobs, three at a time, with a couple of failures
//! collected at the end.
//!
//! Run with: cargo run --example pool

use std::time::Duration;

use opskit::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let pool = WorkerPool::new(3);

    for i in 0..10u32 {
        pool.submit(move |done| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;

                if i % 4 == 0 {
                    done.done(Some(anyhow::anyhow!("job {i} failed")));
                } else {
                    println!("job {i} finished");
                    done.done(None);
                }
            });
            Ok(())
        })
        .await;
    }

    for err in pool.errors().await {
        eprintln!("collected: {err}");
    }
}
