//! Cache configuration and per-call options

use std::time::Duration;

/// GC interval used when the configured interval is zero
pub(crate) const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Configuration for a [`Cache`](crate::Cache) instance
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when a call does not override it. Zero means values are
    /// stale immediately.
    pub default_ttl: Duration,
    /// Grace window applied when a call does not override it. Zero means no
    /// stale serving.
    pub default_grace: Duration,
    /// Minimum spacing between GC sweeps. Zero is replaced by one hour.
    pub gc_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(60),
            default_grace: Duration::from_secs(60),
            gc_interval: DEFAULT_GC_INTERVAL,
        }
    }
}

/// Per-call overrides for [`Cache::get_with_opts`](crate::Cache::get_with_opts).
///
/// Unset fields fall back to the instance defaults; an explicitly-set zero
/// duration is honoured as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    pub(crate) ttl: Option<Duration>,
    pub(crate) grace: Option<Duration>,
}

impl GetOptions {
    /// Create options that use the instance defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the TTL for this call
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Override the grace window for this call
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }
}

/// Per-call overrides for [`Cache::set_with_opts`](crate::Cache::set_with_opts)
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    pub(crate) ttl: Option<Duration>,
    pub(crate) grace: Option<Duration>,
}

impl SetOptions {
    /// Create options that use the instance defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the TTL for this call
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Override the grace window for this call
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }
}
