//! Cache Configuration

use std::time::Duration;

use crate::error::{CacheError, Result};

/// Longest accepted TTL, about thirty years.
pub const MAX_TTL: Duration = Duration::from_secs(86400 * 365 * 30);

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime of every entry, also the sweep interval
    pub ttl: Duration,

    /// Number of map shards (0 = auto-detect)
    pub shard_amount: usize,

    /// Entries to preallocate room for
    pub initial_capacity: usize,
}

impl CacheConfig {
    /// Create a config with the given TTL and default tuning
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            shard_amount: 0,
            initial_capacity: 0,
        }
    }

    /// Set shard count
    pub fn with_shard_amount(mut self, shard_amount: usize) -> Self {
        self.shard_amount = shard_amount;
        self
    }

    /// Set initial capacity
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Reject configurations the sweeper cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() || self.ttl > MAX_TTL {
            return Err(CacheError::InvalidTtl);
        }
        Ok(())
    }

    /// Shard count actually handed to the map.
    ///
    /// The map requires a power of two greater than one.
    pub fn effective_shard_amount(&self) -> usize {
        let requested = if self.shard_amount == 0 {
            num_cpus::get() * 4
        } else {
            self.shard_amount
        };
        requested.max(2).next_power_of_two()
    }
}
