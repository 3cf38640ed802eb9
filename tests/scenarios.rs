use std::thread;
use std::time::Duration;

use expiring_cache::{CacheConfig, CacheError, ExpiringCache};
use tokio::time::sleep;

#[tokio::test]
async fn expired_entry_is_gone_after_prune() {
    let cache = ExpiringCache::new(Duration::from_millis(100)).unwrap();

    cache.put("a", 1);
    sleep(Duration::from_millis(50)).await;
    assert_eq!(cache.get(&"a"), Ok(1));

    sleep(Duration::from_millis(100)).await;
    assert_eq!(cache.get(&"a"), Err(CacheError::KeyNotFound));

    cache.prune();
    assert_eq!(cache.remove(&"a"), Err(CacheError::KeyNotFound));

    cache.shutdown().await;
}

#[tokio::test]
async fn overwrite_restarts_ttl_window() {
    let cache = ExpiringCache::new(Duration::from_millis(50)).unwrap();

    cache.put("x", "hello");
    cache.put("x", "world");
    assert_eq!(cache.get(&"x"), Ok("world"));

    sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get(&"x"), Err(CacheError::KeyNotFound));

    cache.shutdown().await;
}

#[tokio::test]
async fn overwrite_extends_lifetime_of_key() {
    let cache = ExpiringCache::new(Duration::from_millis(200)).unwrap();

    cache.put("k", 1);
    sleep(Duration::from_millis(120)).await;
    cache.put("k", 2);
    sleep(Duration::from_millis(120)).await;

    // 240ms after the first put, 120ms after the second
    assert_eq!(cache.get(&"k"), Ok(2));

    cache.shutdown().await;
}

#[tokio::test]
async fn prune_twice_matches_prune_once() {
    let cache = ExpiringCache::new(Duration::from_millis(40)).unwrap();
    cache.shutdown().await;

    cache.put("old", 1);
    sleep(Duration::from_millis(60)).await;
    cache.put("new", 2);

    assert_eq!(cache.prune(), 1);
    let len = cache.len();
    assert_eq!(cache.prune(), 0);
    assert_eq!(cache.len(), len);
    assert_eq!(cache.get(&"new"), Ok(2));
}

#[tokio::test]
async fn remove_on_absent_key_is_a_noop() {
    let cache = ExpiringCache::new(Duration::from_secs(10)).unwrap();
    cache.put("present", 1);

    assert!(cache.remove(&"absent").unwrap_err().is_not_found());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().removals, 0);

    cache.shutdown().await;
}

#[tokio::test]
async fn clear_drops_everything() {
    let cache = ExpiringCache::new(Duration::from_secs(10)).unwrap();
    for i in 0..32u32 {
        cache.put(i, i * 2);
    }
    assert_eq!(cache.len(), 32);

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get(&3).is_err());

    cache.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_callers_with_running_sweeper() {
    let config = CacheConfig::new(Duration::from_millis(20)).with_shard_amount(8);
    let cache: ExpiringCache<(usize, usize), usize> = ExpiringCache::with_config(config).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    let key = (t, i % 50);
                    cache.put(key, i);
                    // Either the value just written or a miss if it already
                    // expired; never another thread's value.
                    if let Ok(v) = cache.get(&key) {
                        assert_eq!(v, i);
                    }
                    if i % 3 == 0 {
                        if let Ok(v) = cache.remove(&key) {
                            assert_eq!(v, i);
                        }
                        assert!(cache.get(&key).is_err());
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    sleep(Duration::from_millis(100)).await;
    assert!(cache.is_empty());
    assert!(cache.sweeper().cycles() > 0);

    cache.shutdown().await;
}
