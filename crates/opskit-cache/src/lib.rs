//! opskit-cache: keyed in-memory cache with per-item TTL, a post-expiry
//! grace window, and coalesced regeneration.
//!
//! # Features
//!
//! - **Per-item TTL** with per-call overrides
//! - **Grace window** (stale-while-revalidate): expired values are served
//!   while a single background refresh runs
//! - **Single-flight**: concurrent requests for a missing or expired key
//!   share one generator invocation
//! - **Opportunistic GC**: permanently expired entries are swept during
//!   writes, at most once per GC interval
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use opskit_cache::{Cache, CacheConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), opskit_cache::CacheError> {
//!     let cache: Cache<String> = Cache::new(CacheConfig {
//!         default_ttl: Duration::from_secs(60),
//!         default_grace: Duration::from_secs(60),
//!         ..Default::default()
//!     });
//!
//!     let value = cache
//!         .get("greeting", || async { Ok("hello".to_string()) })
//!         .await?;
//!     println!("got: {value}");
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod error;
mod options;

pub use cache::Cache;
pub use error::{CacheError, Result};
pub use options::{CacheConfig, GetOptions, SetOptions};
