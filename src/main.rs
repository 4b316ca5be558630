use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use redis_metrics_reporter::{Registry, Reporter, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod load_generator;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 1. Load configuration ────────────────────────────────────
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path).unwrap_or_else(|e| {
            error!(%path, error = %e, "invalid configuration");
            std::process::exit(1);
        }),
        None => Settings::default(),
    };

    let config = settings.reporter_config().unwrap_or_else(|e| {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    });

    // ── 2. Registry and optional synthetic workload ──────────────
    let registry = Arc::new(Registry::with_clock(config.clock.clone()));
    let running = Arc::new(AtomicBool::new(settings.workload.enabled));

    // ── 3. Connect to Redis ──────────────────────────────────────
    let url = config.store.url();
    let reporter = Reporter::connect(registry.clone(), config)
        .await
        .unwrap_or_else(|e| {
            error!(%url, error = %e, "cannot start reporter");
            std::process::exit(1);
        });

    let workload = settings.workload.enabled.then(|| {
        info!(concurrency = settings.workload.concurrency, "starting synthetic workload");
        tokio::spawn(load_generator::run(
            running.clone(),
            registry.clone(),
            settings.workload.concurrency,
        ))
    });

    // ── 4. Report until Ctrl-C ───────────────────────────────────
    let handle = reporter.start(settings.period);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for shutdown signal");
    }
    info!("shutting down");

    running.store(false, Ordering::SeqCst);
    if let Some(workload) = workload {
        if let Err(e) = workload.await {
            error!(error = %e, "workload task failed");
        }
    }

    if let Err(e) = handle.stop().await {
        error!(error = %e, "reporter task failed");
    }
}
