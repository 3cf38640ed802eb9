//! Expiring Cache
//!
//! Sharded concurrent map whose entries all live for the same fixed TTL,
//! paired with a background sweeper that reclaims expired entries.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use super::entry::Entry;
use super::sweeper::{Sweep, Sweeper, SweeperHandle};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::metrics::{CacheMetrics, CacheStats};

/// State shared by every clone of a cache; the sweeper only holds it weakly.
struct Shared<K, V> {
    map: DashMap<K, Entry<V>>,
    ttl: Duration,
    metrics: CacheMetrics,
    sweeper: SweeperHandle,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn prune(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.map.retain(|_, entry| {
            if entry.is_expired_at(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        self.metrics.record_expired(removed);
        removed
    }
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        self.prune()
    }
}

impl<K, V> Drop for Shared<K, V> {
    fn drop(&mut self) {
        self.sweeper.stop();
    }
}

/// Concurrent key/value cache with a fixed time-to-live.
///
/// Every entry expires `ttl` after it was last `put`. Expired entries are
/// never returned by [`get`](Self::get), whether or not the sweeper has
/// physically removed them yet. The sweeper prunes once at startup and then
/// every `ttl`.
///
/// Cloning is cheap and clones share the same store. The sweeper stops when
/// [`shutdown`](Self::shutdown) is called or the last clone is dropped.
pub struct ExpiringCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for ExpiringCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("ttl", &self.shared.ttl)
            .field("entries", &self.shared.map.len())
            .field("sweeper_running", &self.shared.sweeper.is_running())
            .finish()
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Create a cache with the given TTL, sweeping on the current Tokio runtime.
    ///
    /// Fails with [`CacheError::InvalidTtl`] for a zero TTL or one above
    /// [`MAX_TTL`](crate::config::MAX_TTL), and
    /// [`CacheError::NoRuntime`] when called outside a runtime.
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::new(ttl))
    }

    /// Create a cache from a full configuration on the current Tokio runtime
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Self::with_config_on(config, &runtime)
    }

    /// Create a cache whose sweeper runs on an explicit runtime handle.
    ///
    /// Useful for callers that are not themselves running inside Tokio.
    pub fn with_config_on(config: CacheConfig, runtime: &Handle) -> Result<Self> {
        config.validate()?;

        let map = DashMap::with_capacity_and_shard_amount(
            config.initial_capacity,
            config.effective_shard_amount(),
        );
        let sweeper = SweeperHandle::new();
        let shared = Arc::new(Shared {
            map,
            ttl: config.ttl,
            metrics: CacheMetrics::new(),
            sweeper: sweeper.clone(),
            task: Mutex::new(None),
        });

        let task = Sweeper::new(Arc::downgrade(&shared), config.ttl, sweeper).spawn(runtime);
        *shared.task.lock() = Some(task);

        Ok(Self { shared })
    }

    /// Store `value` under `key`, replacing any previous entry and
    /// restarting the TTL window
    #[inline]
    pub fn put(&self, key: K, value: V) {
        let entry = Entry::new(value, Instant::now(), self.shared.ttl);
        self.shared.map.insert(key, entry);
        self.shared.metrics.record_insert();
    }

    /// Get a copy of the value for `key` if it exists and has not expired
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let now = Instant::now();
        let value = self
            .shared
            .map
            .get(key)
            .and_then(|guard| {
                let entry = guard.value();
                (!entry.is_expired_at(now)).then(|| entry.value().clone())
            });

        match value {
            Some(value) => {
                self.shared.metrics.record_hit();
                Ok(value)
            }
            None => {
                self.shared.metrics.record_miss();
                trace!("Cache miss");
                Err(CacheError::KeyNotFound)
            }
        }
    }

    /// Remove the entry for `key` and return its value.
    ///
    /// No expiry check is applied: an expired entry that has not been pruned
    /// yet is still removed and returned.
    #[inline]
    pub fn remove<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (_, entry) = self.shared.map.remove(key).ok_or(CacheError::KeyNotFound)?;
        self.shared.metrics.record_removal();
        Ok(entry.into_value())
    }

    /// Evict every entry that has expired as of now, returning the count
    pub fn prune(&self) -> usize {
        self.shared.prune()
    }

    /// Check if key exists and is not expired
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.shared
            .map
            .get(key)
            .map(|e| !e.is_expired_at(now))
            .unwrap_or(false)
    }

    /// Get the number of entries (including expired ones not yet pruned)
    pub fn len(&self) -> usize {
        self.shared.map.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.shared.map.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.shared.map.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> CacheStats {
        self.shared
            .metrics
            .snapshot(self.shared.map.len(), self.shared.sweeper.cycles())
    }

    /// Handle to the background sweeper, for observation
    pub fn sweeper(&self) -> SweeperHandle {
        self.shared.sweeper.clone()
    }

    /// Stop the sweeper and wait for it to exit.
    ///
    /// The cache stays usable afterwards, but expired entries are only
    /// reclaimed by explicit [`prune`](Self::prune) calls. Calling this
    /// more than once is harmless.
    pub async fn shutdown(&self) {
        self.shared.sweeper.stop();
        let task = self.shared.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Expiry sweeper exited abnormally: {}", e);
            }
        }
    }
}
