//! Cache Entry

use std::time::{Duration, Instant};

/// Entry in the store with value and expiration
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    /// `None` when `now + ttl` is past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// Create an entry that expires `ttl` after `now`
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// Expired at or after the expiry instant
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.map(|t| now >= t).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let now = Instant::now();
        let entry = Entry::new("v", now, Duration::from_millis(100));

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::from_millis(99)));
        assert!(entry.is_expired_at(now + Duration::from_millis(100)));
        assert!(entry.is_expired_at(now + Duration::from_secs(1)));
        assert_eq!(entry.into_value(), "v");
    }

    #[test]
    fn test_unrepresentable_expiry_never_expires() {
        let now = Instant::now();
        let entry = Entry::new(1, now, Duration::MAX);

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::from_secs(86400 * 365)));
        assert_eq!(*entry.value(), 1);
    }
}
