use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::clock::{Clock, SystemClock};
use super::meter::Meter;
use super::reservoir::{UniformReservoir, DEFAULT_SIZE};
use super::{GaugeValue, HistogramSnapshot, MetricGroups, MetricKind, TimerSnapshot};
use crate::filter::MetricFilter;

// ─── Instruments ─────────────────────────────────────────────────

/// Integer count that can move both ways.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn inc(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: i64) {
        self.count.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Distribution of values, sampled into a uniform reservoir.
pub struct Histogram {
    count: AtomicU64,
    reservoir: UniformReservoir,
}

impl Histogram {
    pub fn new(reservoir: UniformReservoir) -> Self {
        Self {
            count: AtomicU64::new(0),
            reservoir,
        }
    }

    pub fn update(&self, value: i64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.reservoir.update(value);
    }

    /// Every value ever recorded, not just the sampled ones.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count(),
            snapshot: self.reservoir.snapshot(),
        }
    }
}

/// Meter of invocations plus a histogram of their durations (nanoseconds).
pub struct Timer {
    clock: Arc<dyn Clock>,
    meter: Meter,
    histogram: Histogram,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>, reservoir: UniformReservoir) -> Self {
        Self {
            meter: Meter::new(clock.clone()),
            histogram: Histogram::new(reservoir),
            clock,
        }
    }

    pub fn update(&self, elapsed: Duration) {
        let nanos = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
        self.histogram.update(nanos);
        self.meter.mark(1);
    }

    /// Starts timing; the duration is recorded when the context is
    /// stopped or dropped.
    pub fn time(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            start: self.clock.tick(),
            stopped: false,
        }
    }

    pub fn count(&self) -> u64 {
        self.meter.count()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            rates: self.meter.snapshot(),
            durations: self.histogram.reservoir.snapshot(),
        }
    }
}

/// An in-flight timing started by [`Timer::time`].
pub struct TimerContext<'a> {
    timer: &'a Timer,
    start: u64,
    stopped: bool,
}

impl TimerContext<'_> {
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        self.stopped = true;
        let elapsed = Duration::from_nanos(self.timer.clock.tick().saturating_sub(self.start));
        self.timer.update(elapsed);
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        if !self.stopped {
            self.record();
        }
    }
}

type GaugeFn = Arc<dyn Fn() -> GaugeValue + Send + Sync>;

// ─── Registry ────────────────────────────────────────────────────

/// Thread-safe home of every named metric.
/// Instrumented code grabs handles, the reporter calls `snapshot()`.
pub struct Registry {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    gauges: BTreeMap<String, GaugeFn>,
    counters: BTreeMap<String, Arc<Counter>>,
    histograms: BTreeMap<String, Arc<Histogram>>,
    meters: BTreeMap<String, Arc<Meter>>,
    timers: BTreeMap<String, Arc<Timer>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Registers (or replaces) a gauge read through `read` at report time.
    pub fn gauge<F, V>(&self, name: impl Into<String>, read: F)
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<GaugeValue>,
    {
        let read: GaugeFn = Arc::new(move || read().into());
        self.inner.lock().gauges.insert(name.into(), read);
    }

    pub fn counter(&self, name: &str) -> Arc<Counter> {
        let mut inner = self.inner.lock();
        inner.counters.entry(name.to_owned()).or_default().clone()
    }

    pub fn histogram(&self, name: &str) -> Arc<Histogram> {
        let mut inner = self.inner.lock();
        inner
            .histograms
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(Histogram::new(UniformReservoir::new(DEFAULT_SIZE))))
            .clone()
    }

    pub fn meter(&self, name: &str) -> Arc<Meter> {
        let mut inner = self.inner.lock();
        let clock = self.clock.clone();
        inner
            .meters
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(Meter::new(clock)))
            .clone()
    }

    pub fn timer(&self, name: &str) -> Arc<Timer> {
        let mut inner = self.inner.lock();
        let clock = self.clock.clone();
        inner
            .timers
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(Timer::new(clock, UniformReservoir::new(DEFAULT_SIZE))))
            .clone()
    }

    /// Drops the metric of the given kind. Returns whether it existed.
    pub fn remove(&self, name: &str, kind: MetricKind) -> bool {
        let mut inner = self.inner.lock();
        match kind {
            MetricKind::Gauge => inner.gauges.remove(name).is_some(),
            MetricKind::Counter => inner.counters.remove(name).is_some(),
            MetricKind::Histogram => inner.histograms.remove(name).is_some(),
            MetricKind::Meter => inner.meters.remove(name).is_some(),
            MetricKind::Timer => inner.timers.remove(name).is_some(),
        }
    }

    /// Captures the current value of every metric accepted by `filter`.
    ///
    /// Handles are collected under the lock; gauge callbacks and instrument
    /// snapshots run after it is released.
    pub fn snapshot(&self, filter: &dyn MetricFilter) -> MetricGroups {
        let (gauges, counters, histograms, meters, timers) = {
            let inner = self.inner.lock();
            (
                accepted(&inner.gauges, MetricKind::Gauge, filter),
                accepted(&inner.counters, MetricKind::Counter, filter),
                accepted(&inner.histograms, MetricKind::Histogram, filter),
                accepted(&inner.meters, MetricKind::Meter, filter),
                accepted(&inner.timers, MetricKind::Timer, filter),
            )
        };

        MetricGroups {
            gauges: gauges.into_iter().map(|(n, read)| (n, read())).collect(),
            counters: counters.into_iter().map(|(n, c)| (n, c.count())).collect(),
            histograms: histograms.into_iter().map(|(n, h)| (n, h.snapshot())).collect(),
            meters: meters.into_iter().map(|(n, m)| (n, m.snapshot())).collect(),
            timers: timers.into_iter().map(|(n, t)| (n, t.snapshot())).collect(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn accepted<T: Clone>(
    group: &BTreeMap<String, T>,
    kind: MetricKind,
    filter: &dyn MetricFilter,
) -> Vec<(String, T)> {
    group
        .iter()
        .filter(|(name, _)| filter.matches(name, kind))
        .map(|(name, metric)| (name.clone(), metric.clone()))
        .collect()
}
