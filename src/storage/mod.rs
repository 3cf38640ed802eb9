//! Storage Engine
//!
//! Expiring key-value store and its background sweeper.

mod cache;
mod entry;
mod sweeper;

pub use cache::ExpiringCache;
pub use sweeper::SweeperHandle;
