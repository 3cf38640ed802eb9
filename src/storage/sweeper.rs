//! Expiry Sweeper
//!
//! Background task that periodically removes expired entries from the cache.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Something the sweeper can prune.
pub(crate) trait Sweep: Send + Sync + 'static {
    /// Evict expired entries, returning how many were removed
    fn sweep(&self) -> usize;
}

#[derive(Debug, Default)]
struct SweeperState {
    running: AtomicBool,
    cycles: AtomicU64,
}

/// Clears the running flag however the task ends: normal exit, panic,
/// abort, or its runtime shutting down.
struct RunningGuard(Arc<SweeperState>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
    }
}

/// Observable handle to a cache's sweeper task.
///
/// Cloning is cheap; every clone controls the same task.
#[derive(Debug, Clone)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    wake: Arc<Notify>,
    state: Arc<SweeperState>,
}

impl SweeperHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            wake: Arc::new(Notify::new()),
            state: Arc::default(),
        }
    }

    /// True until the task has exited
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Number of completed prune cycles
    pub fn cycles(&self) -> u64 {
        self.state.cycles.load(Ordering::Relaxed)
    }

    /// Wake the sweeper so it prunes now instead of at its next tick.
    ///
    /// A wake requested while a prune is in progress triggers one more prune.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Signal the task to exit without waiting for it
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// True once a stop has been requested
    pub fn is_stopping(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Background sweep loop for one cache
pub(crate) struct Sweeper<T> {
    target: Weak<T>,
    interval: Duration,
    handle: SweeperHandle,
}

impl<T: Sweep> Sweeper<T> {
    /// Create a new sweeper over a weakly held target
    pub fn new(target: Weak<T>, interval: Duration, handle: SweeperHandle) -> Self {
        Self {
            target,
            interval,
            handle,
        }
    }

    /// Run the sweeper (should be spawned as a task)
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.interval, "Expiry sweeper started");

        loop {
            tokio::select! {
                biased;
                _ = self.handle.cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = self.handle.wake.notified() => {
                    debug!("Expiry sweeper woken early");
                    ticker.reset();
                }
            }

            // The cache owns the store; once it is gone there is nothing to sweep.
            let Some(target) = self.target.upgrade() else {
                break;
            };
            let evicted = target.sweep();
            drop(target);

            self.handle.state.cycles.fetch_add(1, Ordering::Relaxed);
            if evicted > 0 {
                debug!(evicted = evicted, "Swept expired entries");
            }
        }

        info!("Expiry sweeper stopped");
    }

    /// Spawn the sweeper as a background task on `runtime`
    pub fn spawn(self, runtime: &Handle) -> JoinHandle<()> {
        self.handle.state.running.store(true, Ordering::Release);
        let guard = RunningGuard(Arc::clone(&self.handle.state));
        runtime.spawn(async move {
            let _guard = guard;
            self.run().await
        })
    }
}
