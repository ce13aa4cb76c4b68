//! opskit: building blocks for backend services.
//!
//! # Components
//!
//! - **Cache** — keyed in-memory cache with per-item TTL, a
//!   stale-while-revalidate grace window, single-flight regeneration, and
//!   opportunistic garbage collection
//! - **Worker pool** — bounded-concurrency dispatcher with per-job error
//!   collection and asynchronous completion
//! - **Utilities** — WHOIS/RADb queries, string and ARN formatting, JWT
//!   validation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use opskit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CacheError> {
//!     let cache: Cache<String> = Cache::with_defaults();
//!     let value = cache
//!         .get("motd", || async { Ok("hello".to_string()) })
//!         .await?;
//!     println!("{value}");
//!
//!     let pool = WorkerPool::new(3);
//!     pool.submit(|done| {
//!         tokio::spawn(async move { done.done(None) });
//!         Ok(())
//!     })
//!     .await;
//!     pool.wait().await;
//!
//!     Ok(())
//! }
//! ```

// Re-export the core components
pub use opskit_cache::{Cache, CacheConfig, CacheError, GetOptions, SetOptions};
pub use opskit_pool::{Completion, WorkerPool};

// Peripheral utilities keep their own namespaces
pub use opskit_format as format;
pub use opskit_jwt as jwt;
pub use opskit_whois as whois;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Cache, CacheConfig, CacheError, Completion, GetOptions, SetOptions, WorkerPool,
    };
}

#[cfg(test)]
mod tests;
