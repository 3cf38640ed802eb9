//! Expiring Cache - concurrent in-memory key/value store with a fixed TTL
//!
//! Every entry lives for the TTL the cache was built with. Reads treat an
//! expired entry as absent straight away, while a background sweeper task
//! reclaims the memory once per TTL interval.
//!
//! ```no_run
//! use std::time::Duration;
//! use expiring_cache::ExpiringCache;
//!
//! # async fn demo() -> expiring_cache::Result<()> {
//! let cache = ExpiringCache::new(Duration::from_secs(30))?;
//! cache.put("session", 42);
//! assert_eq!(cache.get(&"session")?, 42);
//! cache.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;

pub use config::{CacheConfig, MAX_TTL};
pub use error::{CacheError, Result};
pub use metrics::CacheStats;
pub use storage::{ExpiringCache, SweeperHandle};
