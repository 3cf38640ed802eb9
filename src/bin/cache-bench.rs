//! Cache Bench Binary
//!
//! Drives an `ExpiringCache` from several threads at once and reports
//! throughput, latency and cache statistics.

use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use clap::Parser;
use expiring_cache::{CacheConfig, ExpiringCache};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Cache Bench - concurrent load driver for the expiring cache
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Entry TTL (and sweep interval) in milliseconds
    #[arg(long, default_value_t = 250)]
    ttl_ms: u64,

    /// Worker threads (0 = auto-detect based on CPU cores)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Operations per thread
    #[arg(short, long, default_value_t = 100_000)]
    ops: u64,

    /// Distinct keys per thread
    #[arg(short, long, default_value_t = 1_000)]
    keys: u64,

    /// Value size in bytes
    #[arg(long, default_value_t = 64)]
    value_size: usize,
}

#[derive(Debug, Clone)]
struct LoadStats {
    completed: u64,
    duration: Duration,
    avg_latency: Duration,
    p99_latency: Duration,
    rps: f64,
}

impl LoadStats {
    fn from_latencies(latencies: &mut [Duration], duration: Duration) -> Self {
        if latencies.is_empty() {
            return Self {
                completed: 0,
                duration,
                avg_latency: Duration::ZERO,
                p99_latency: Duration::ZERO,
                rps: 0.0,
            };
        }
        latencies.sort_unstable();
        let sum: Duration = latencies.iter().sum();
        let p99_idx = (latencies.len() as f64 * 0.99) as usize;
        Self {
            completed: latencies.len() as u64,
            duration,
            avg_latency: sum / latencies.len() as u32,
            p99_latency: latencies[p99_idx.min(latencies.len() - 1)],
            rps: latencies.len() as f64 / duration.as_secs_f64(),
        }
    }

    fn report(&self) -> String {
        format!(
            "Completed: {} in {:.2}s, RPS: {:.0}, Avg: {:.2}µs, P99: {:.2}µs",
            self.completed,
            self.duration.as_secs_f64(),
            self.rps,
            self.avg_latency.as_secs_f64() * 1_000_000.0,
            self.p99_latency.as_secs_f64() * 1_000_000.0
        )
    }
}

/// One worker's share of the load, on keys no other worker touches.
fn run_worker(
    cache: ExpiringCache<String, Bytes>,
    worker: usize,
    ops: u64,
    keys: u64,
    value: Bytes,
) -> Vec<Duration> {
    let mut latencies = Vec::with_capacity(ops as usize);
    for i in 0..ops {
        let key = format!("w{}-k{}", worker, i % keys);
        let start = Instant::now();
        // 60% reads, 30% writes, 10% removes
        match i % 10 {
            0..=5 => {
                let _ = cache.get(&key);
            }
            6..=8 => cache.put(key, value.clone()),
            _ => {
                let _ = cache.remove(&key);
            }
        }
        latencies.push(start.elapsed());
    }
    latencies
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("expiring_cache=info".parse()?))
        .init();

    let args = Args::parse();
    let threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };
    let ttl = Duration::from_millis(args.ttl_ms);
    let keys = args.keys.max(1);

    let config = CacheConfig::new(ttl)
        .with_shard_amount(threads * 4)
        .with_initial_capacity(threads * keys as usize);
    let cache: ExpiringCache<String, Bytes> = ExpiringCache::with_config(config)?;
    let value = Bytes::from(vec![b'x'; args.value_size]);

    info!(
        "Running {} threads x {} ops over {} keys each, ttl {:?}",
        threads, args.ops, keys, ttl
    );

    let started = Instant::now();
    let workers: Vec<_> = (0..threads)
        .map(|worker| {
            let cache = cache.clone();
            let value = value.clone();
            let ops = args.ops;
            thread::spawn(move || run_worker(cache, worker, ops, keys, value))
        })
        .collect();

    let mut latencies = Vec::with_capacity(threads * args.ops as usize);
    for worker in workers {
        let worker_latencies = worker
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
        latencies.extend(worker_latencies);
    }
    let elapsed = started.elapsed();

    println!("{}", LoadStats::from_latencies(&mut latencies, elapsed).report());
    println!("Before expiry: {}", cache.stats().summary());

    // Everything written is expired after one TTL; wake the sweeper rather
    // than waiting for its next tick.
    tokio::time::sleep(ttl).await;
    cache.sweeper().wake();
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.shutdown().await;

    println!("After expiry:  {}", cache.stats().summary());

    Ok(())
}
