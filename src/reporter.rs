use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::config::{ReporterConfig, MIN_PERIOD};
use crate::error::{ConfigError, StartError};
use crate::extract;
use crate::keys::key_for;
use crate::metrics::{MetricGroups, Registry};
use crate::store::{RedisStore, Store};

/// Outcome of one report cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Metrics visited.
    pub metrics: usize,
    /// Keys written successfully.
    pub written: usize,
    /// Keys whose write failed.
    pub failed: usize,
}

/// Drains a [`Registry`] into a [`Store`], one cycle at a time.
///
/// The reporter owns its store exclusively. Cycles are sequential: every
/// write is awaited before the next one starts.
pub struct Reporter<S> {
    registry: Arc<Registry>,
    store: S,
    config: ReporterConfig,
}

impl Reporter<RedisStore> {
    /// Validates the configured store target, connects to it and builds a
    /// reporter owning that connection.
    pub async fn connect(
        registry: Arc<Registry>,
        config: ReporterConfig,
    ) -> Result<Self, StartError> {
        let client = config.store.client()?;
        let store = RedisStore::connect(client).await?;
        Ok(Self::new(registry, store, config)?)
    }
}

impl<S: Store> Reporter<S> {
    /// Fails with [`ConfigError::InvalidTarget`] when the configured store
    /// target is unusable, so a misconfigured reporter never starts.
    pub fn new(
        registry: Arc<Registry>,
        store: S,
        config: ReporterConfig,
    ) -> Result<Self, ConfigError> {
        config.store.validate()?;
        Ok(Self {
            registry,
            store,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one cycle against the registry's current state.
    pub async fn report(&mut self) -> CycleSummary {
        let groups = self.registry.snapshot(self.config.filter.as_ref());
        self.report_groups(&groups).await
    }

    /// Writes every statistic of every metric in `groups`.
    ///
    /// A failed write is logged and counted; the cycle carries on with the
    /// next key. Nothing is retried.
    pub async fn report_groups(&mut self, groups: &MetricGroups) -> CycleSummary {
        let started_at = self
            .config
            .clock
            .now()
            .with_timezone(&self.config.time_zone);
        let units = self.config.units();
        let mut summary = CycleSummary::default();

        for (name, metric) in groups.iter() {
            summary.metrics += 1;

            for (statistic, value) in extract::extract(metric, &units) {
                let key = key_for(name, statistic);
                match self.store.set(&key, &value).await {
                    Ok(()) => summary.written += 1,
                    Err(e) => {
                        summary.failed += 1;
                        warn!(%key, kind = %metric.kind(), error = %e, "failed to write metric");
                    }
                }
            }
        }

        debug!(
            %started_at,
            metrics = summary.metrics,
            written = summary.written,
            failed = summary.failed,
            "report cycle finished"
        );
        summary
    }
}

impl<S: Store + 'static> Reporter<S> {
    /// Spawns a task running one cycle every `period`, the first one a full
    /// period after the call. Cycles never overlap; a slow cycle delays the
    /// next tick instead of bunching them up. Periods below [`MIN_PERIOD`]
    /// are raised to it; config files reject them up front.
    pub fn start(self, period: Duration) -> ReporterHandle<S> {
        let period = period.max(MIN_PERIOD);
        let (shutdown, mut stopped) = oneshot::channel::<()>();

        info!(
            period = ?period,
            rate_unit = self.config.rate_unit.name(),
            duration_unit = self.config.duration_unit.name(),
            locale = %self.config.locale,
            "starting reporter"
        );

        let task = tokio::spawn(async move {
            let mut reporter = self;

            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = IntervalStream::new(interval);

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    Some(_) = ticks.next() => {
                        reporter.report().await;
                    }
                }
            }

            if reporter.config.report_on_stop {
                reporter.report().await;
            }
            info!("reporter stopped");
            reporter
        });

        ReporterHandle {
            shutdown: Some(shutdown),
            task,
        }
    }
}

/// Handle to a scheduled reporter. Dropping it stops the schedule without
/// waiting for the task.
pub struct ReporterHandle<S> {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Reporter<S>>,
}

impl<S> ReporterHandle<S> {
    /// Stops the schedule, waits for a cycle in progress (and the final
    /// cycle, if configured) and returns the reporter with its store.
    pub async fn stop(mut self) -> Result<Reporter<S>, JoinError> {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already be gone; the join below reports why.
            let _ = shutdown.send(());
        }
        self.task.await
    }
}
