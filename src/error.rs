//! Error types
//!
//! A cache miss is an ordinary outcome, so it travels as a `Result` like
//! every other condition the cache can report.

use thiserror::Error;

/// Result type alias using `CacheError`.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors reported by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// No live entry for the key (`get`) or no entry at all (`remove`).
    #[error("key not found")]
    KeyNotFound,

    /// The configured TTL was zero.
    #[error("invalid ttl: must be greater than zero")]
    InvalidTtl,

    /// No Tokio runtime was available to host the sweeper.
    #[error("no tokio runtime available to run the sweeper")]
    NoRuntime,
}

impl CacheError {
    /// True for a plain cache miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotFound)
    }
}
