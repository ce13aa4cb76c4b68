//! Core cache type: item map, read protocol, and generation passes

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::error::{CacheError, Result};
use crate::options::{CacheConfig, GetOptions, SetOptions, DEFAULT_GC_INTERVAL};

/// Outcome of one generation pass, broadcast to every waiting reader.
/// `None` until the pass completes.
type Pass<T> = Option<Result<T>>;

/// One cached entry. All fields are read and written under the cache's
/// map lock; `ready` is the one-shot completion signal for the pass that
/// is currently running (or most recently ran) for this key.
struct Item<T> {
    data: Option<T>,
    err: Option<CacheError>,
    working: bool,
    ready: watch::Sender<Pass<T>>,
    created: i64,
    expires: i64,
    banned: i64,
}

impl<T> Item<T> {
    /// Placeholder installed when a generation pass starts for a new key.
    /// Timestamps stay zero until the first write, which also keeps the
    /// entry out of GC's reach (`banned` must be positive to evict).
    fn pending() -> (Self, watch::Receiver<Pass<T>>) {
        let (ready, rx) = watch::channel(None);
        let item = Self {
            data: None,
            err: None,
            working: true,
            ready,
            created: 0,
            expires: 0,
            banned: 0,
        };
        (item, rx)
    }
}

struct State<T> {
    last_gc: i64,
    items: HashMap<String, Item<T>>,
}

impl<T> State<T> {
    /// Remove every entry that is past its ban point and not mid-generation.
    fn purge_expired(&mut self, now: i64) -> usize {
        let before = self.items.len();
        self.items
            .retain(|_, item| item.working || item.banned <= 0 || now < item.banned);
        before - self.items.len()
    }
}

struct Shared<T> {
    default_ttl: i64,
    default_grace: i64,
    gc_interval: i64,
    state: RwLock<State<T>>,
}

/// Point-in-time view of an item, taken under the read lock
struct Snapshot<T> {
    data: Option<T>,
    err: Option<CacheError>,
    working: bool,
    expires: i64,
    banned: i64,
    ready: watch::Receiver<Pass<T>>,
}

/// Keyed in-memory cache with TTL, grace windows, and single-flight
/// regeneration.
///
/// Cloning creates a new handle to the SAME underlying store.
pub struct Cache<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Cache<T> {
    /// Create a new cache. A zero `gc_interval` is replaced by the one-hour
    /// default.
    pub fn new(config: CacheConfig) -> Self {
        let gc_interval = if config.gc_interval.is_zero() {
            DEFAULT_GC_INTERVAL
        } else {
            config.gc_interval
        };

        Self {
            shared: Arc::new(Shared {
                default_ttl: to_nanos(config.default_ttl),
                default_grace: to_nanos(config.default_grace),
                gc_interval: to_nanos(gc_interval),
                state: RwLock::new(State {
                    last_gc: now_nanos(),
                    items: HashMap::new(),
                }),
            }),
        }
    }

    /// Create a cache with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Number of entries currently held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.shared.state.read().items.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.shared.state.read().items.is_empty()
    }

    /// Run a GC sweep immediately, returning the number of evicted entries.
    #[cfg(test)]
    pub(crate) fn sweep(&self) -> usize {
        self.shared.state.write().purge_expired(now_nanos())
    }
}

impl<T> Cache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Get the value for `key`, generating it with `generator` if needed.
    /// Uses the instance defaults for TTL and grace.
    pub async fn get<F, Fut>(&self, key: &str, generator: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.get_with_opts(key, GetOptions::new(), generator).await
    }

    /// Get the value for `key` with per-call TTL/grace overrides.
    ///
    /// A fresh value is returned immediately. An expired value still inside
    /// its grace window is returned immediately as well, and a single
    /// background refresh is started. Otherwise the caller waits for the
    /// in-flight (or newly started) generation pass and returns its result.
    ///
    /// `generator` is invoked at most once per generation pass across all
    /// concurrent callers of the same key.
    pub async fn get_with_opts<F, Fut>(&self, key: &str, opts: GetOptions, generator: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let ttl = opts.ttl.map_or(self.shared.default_ttl, to_nanos);
        let grace = opts.grace.map_or(self.shared.default_grace, to_nanos);
        let now = now_nanos();

        let snapshot = {
            let state = self.shared.state.read();
            state.items.get(key).map(|item| Snapshot {
                data: item.data.clone(),
                err: item.err.clone(),
                working: item.working,
                expires: item.expires,
                banned: item.banned,
                ready: item.ready.subscribe(),
            })
        };

        // Grace applies only when the previous pass succeeded; a stored
        // error always forces a wait on a fresh pass.
        if let Some(snap) = &snapshot {
            if snap.err.is_none() {
                if let Some(data) = &snap.data {
                    // Fresh hit
                    if now < snap.expires {
                        return Ok(data.clone());
                    }

                    // Expired but within grace: serve stale, refresh in the
                    // background without blocking this caller
                    if now < snap.banned {
                        if !snap.working {
                            self.refresh(key, ttl, grace, generator);
                        }
                        return Ok(data.clone());
                    }
                }
            }
        }

        // Complete miss, stored error, or past the ban point: join the
        // running pass if there is one, otherwise start our own.
        let ready = match snapshot {
            Some(snap) if snap.working => snap.ready,
            _ => self.start(key, ttl, grace, generator),
        };

        self.wait_ready(ready).await
    }

    /// Insert or overwrite `key` with the instance defaults.
    ///
    /// The value is observable by any `get` issued after this returns.
    pub async fn set(&self, key: &str, value: T) {
        self.set_with_opts(key, value, SetOptions::new()).await;
    }

    /// Insert or overwrite `key` with per-call TTL/grace overrides.
    pub async fn set_with_opts(&self, key: &str, value: T, opts: SetOptions) {
        let ttl = opts.ttl.map_or(self.shared.default_ttl, to_nanos);
        let grace = opts.grace.map_or(self.shared.default_grace, to_nanos);

        let exists = self.shared.state.read().items.contains_key(key);
        let generator = move || async move { Ok(value) };

        let ready = if exists {
            self.refresh(key, ttl, grace, generator)
        } else {
            self.start(key, ttl, grace, generator)
        };

        // If a generation pass was already running it wins the race and the
        // supplied value is dropped; either way the entry is settled once
        // the pass completes.
        let _ = self.wait_ready(ready).await;
    }

    /// Wait for a generation pass to complete and return its result
    async fn wait_ready(&self, mut ready: watch::Receiver<Pass<T>>) -> Result<T> {
        match ready.wait_for(|pass| pass.is_some()).await {
            Ok(pass) => (*pass).clone().unwrap_or_else(|| {
                Err(CacheError::Internal(
                    "generation pass completed without a result".to_string(),
                ))
            }),
            Err(_) => Err(CacheError::Internal(
                "generation pass interrupted".to_string(),
            )),
        }
    }

    /// Ensure a generation pass is running for a missing or dead key.
    ///
    /// If another caller won the race the existing pass is joined; otherwise
    /// the old entry (if any) is replaced by a working placeholder and the
    /// generator is dispatched on a background task.
    fn start<F, Fut>(&self, key: &str, ttl: i64, grace: i64, generator: F) -> watch::Receiver<Pass<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (ready, run) = {
            let mut state = self.shared.state.write();
            match state.items.get(key) {
                Some(item) if item.working => (item.ready.subscribe(), false),
                _ => {
                    let (item, rx) = Item::pending();
                    state.items.insert(key.to_string(), item);
                    (rx, true)
                }
            }
        };

        if run {
            self.spawn_generator(key.to_string(), ttl, grace, generator);
        }

        ready
    }

    /// Ensure a generation pass is running for an existing key, keeping its
    /// current value in place for grace readers.
    ///
    /// The previous `ready` signal belongs to the finished pass, so a fresh
    /// one is installed for the new pass's waiters.
    fn refresh<F, Fut>(
        &self,
        key: &str,
        ttl: i64,
        grace: i64,
        generator: F,
    ) -> watch::Receiver<Pass<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (ready, run) = {
            let mut state = self.shared.state.write();
            match state.items.get_mut(key) {
                Some(item) if item.working => (item.ready.subscribe(), false),
                Some(item) => {
                    tracing::trace!(key, created = item.created, "starting refresh pass");
                    let (ready, rx) = watch::channel(None);
                    item.working = true;
                    item.ready = ready;
                    (rx, true)
                }
                None => {
                    let (item, rx) = Item::pending();
                    state.items.insert(key.to_string(), item);
                    (rx, true)
                }
            }
        };

        if run {
            self.spawn_generator(key.to_string(), ttl, grace, generator);
        }

        ready
    }

    /// Run the generator on its own task and apply its result.
    ///
    /// The generator future is spawned separately so that a panic inside it
    /// surfaces as a join error here instead of leaving the item working
    /// forever; the failure flows through the normal write path.
    fn spawn_generator<F, Fut>(&self, key: String, ttl: i64, grace: i64, generator: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache = self.clone();
        let task = tokio::spawn(generator());

        tokio::spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => Err(CacheError::Internal(format!("generator task failed: {err}"))),
            };

            cache.write(&key, ttl, grace, result);
        });
    }

    /// Apply a completed generation pass: store the result, refresh the
    /// timestamps, clear `working`, opportunistically GC, then signal the
    /// pass's waiters.
    fn write(&self, key: &str, ttl: i64, grace: i64, result: Result<T>) {
        let ready = {
            let mut state = self.shared.state.write();
            let now = now_nanos();

            let Some(item) = state.items.get_mut(key) else {
                return;
            };

            match &result {
                Ok(data) => {
                    item.data = Some(data.clone());
                    item.err = None;
                }
                Err(err) => {
                    item.data = None;
                    item.err = Some(err.clone());
                }
            }

            item.working = false;
            item.created = now;
            item.expires = now.saturating_add(ttl);
            item.banned = now.saturating_add(ttl).saturating_add(grace);

            let ready = item.ready.clone();

            if self.shared.gc_interval > 0 && now >= state.last_gc + self.shared.gc_interval {
                state.last_gc = now;
                let purged = state.purge_expired(now);
                if purged > 0 {
                    tracing::debug!(purged, "swept expired cache entries");
                }
            }

            ready
        };

        // Signalled outside the lock; fires exactly once per pass
        ready.send_replace(Some(result));
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

fn to_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}
