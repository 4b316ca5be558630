use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use redis_metrics_reporter::Registry;

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `concurrency` Tokio tasks that simulate request handling and
/// record what they do into `registry`, until `running` is set to false.
pub async fn run(running: Arc<AtomicBool>, registry: Arc<Registry>, concurrency: u32) {
    let active = Arc::new(AtomicBool::new(true));
    let flag = active.clone();
    registry.gauge("workload.running", move || flag.load(Ordering::Relaxed));
    registry.gauge("workload.workers", move || concurrency);

    let mut handles = Vec::with_capacity(concurrency as usize);

    for worker_id in 0..concurrency {
        let running = running.clone();
        let registry = registry.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, running, registry).await;
        }));
    }

    // Wait for all workers to finish
    for h in handles {
        let _ = h.await;
    }

    active.store(false, Ordering::Relaxed);
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(id: u32, running: Arc<AtomicBool>, registry: Arc<Registry>) {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);

    let requests = registry.meter("workload.requests");
    let errors = registry.counter("workload.errors");
    let in_flight = registry.counter("workload.in-flight");
    let payload = registry.histogram("workload.payload-bytes");
    let latency = registry.timer("workload.latency");

    while running.load(Ordering::Relaxed) {
        in_flight.inc(1);
        let ctx = latency.time();

        // 70 % fast path, 30 % slow path
        let pause_ms = if rng.gen_bool(0.7) {
            rng.gen_range(1..=20u64)
        } else {
            rng.gen_range(50..=250u64)
        };
        tokio::time::sleep(Duration::from_millis(pause_ms)).await;

        ctx.stop();
        in_flight.dec(1);
        requests.mark(1);
        payload.update(rng.gen_range(128..=16_384i64));

        if rng.gen_ratio(1, 50) {
            errors.inc(1);
        }
    }
}
