//! Stale-while-revalidate demo: an expired value keeps being served while
//! a single background refresh regenerates it.
//!
//! Run with: cargo run --example swr

use std::time::Duration;

use opskit::prelude::*;

#[tokio::main]
async fn main() -> Result<(), CacheError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let cache: Cache<String> = Cache::new(CacheConfig {
        default_ttl: Duration::from_millis(500),
        default_grace: Duration::from_secs(30),
        ..Default::default()
    });

    for round in 0..6 {
        let value = cache
            .get("now", || async {
                // Slow upstream call
                tokio::time::sleep(Duration::from_millis(300)).await;
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default();
                Ok(format!("generated at {}ms", now.as_millis()))
            })
            .await?;

        println!("round {round}: {value}");
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    Ok(())
}
