use std::sync::Arc;

use parking_lot::Mutex;

use super::clock::Clock;
use super::MeterSnapshot;

/// Moving averages are ticked on this fixed interval.
const TICK_INTERVAL_NANOS: u64 = 5_000_000_000;
const TICK_INTERVAL_SECS: f64 = 5.0;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

// ─── EWMA ────────────────────────────────────────────────────────

/// Exponentially weighted moving average of an event rate, in events
/// per second.
#[derive(Debug, Clone)]
struct Ewma {
    alpha: f64,
    rate: f64,
    uncounted: u64,
    initialized: bool,
}

impl Ewma {
    fn over_minutes(minutes: f64) -> Self {
        Self {
            alpha: 1.0 - (-TICK_INTERVAL_SECS / 60.0 / minutes).exp(),
            rate: 0.0,
            uncounted: 0,
            initialized: false,
        }
    }

    fn update(&mut self, n: u64) {
        self.uncounted += n;
    }

    fn tick(&mut self) {
        let instant_rate = self.uncounted as f64 / TICK_INTERVAL_SECS;
        self.uncounted = 0;

        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }
}

// ─── Meter ───────────────────────────────────────────────────────

/// Counts events and tracks their mean rate plus 1-, 5- and 15-minute
/// moving average rates.
pub struct Meter {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

struct Inner {
    count: u64,
    start: u64,
    last_tick: u64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

impl Meter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.tick();
        Self {
            clock,
            inner: Mutex::new(Inner {
                count: 0,
                start: now,
                last_tick: now,
                m1: Ewma::over_minutes(1.0),
                m5: Ewma::over_minutes(5.0),
                m15: Ewma::over_minutes(15.0),
            }),
        }
    }

    pub fn mark(&self, n: u64) {
        let now = self.clock.tick();
        let mut inner = self.inner.lock();
        inner.tick_if_necessary(now);

        inner.count += n;
        inner.m1.update(n);
        inner.m5.update(n);
        inner.m15.update(n);
    }

    pub fn count(&self) -> u64 {
        self.inner.lock().count
    }

    /// Current count and rates, in events per second.
    pub fn snapshot(&self) -> MeterSnapshot {
        let now = self.clock.tick();
        let mut inner = self.inner.lock();
        inner.tick_if_necessary(now);

        MeterSnapshot {
            count: inner.count,
            mean_rate: inner.mean_rate(now),
            one_minute_rate: inner.m1.rate,
            five_minute_rate: inner.m5.rate,
            fifteen_minute_rate: inner.m15.rate,
        }
    }
}

impl Inner {
    fn tick_if_necessary(&mut self, now: u64) {
        let age = now.saturating_sub(self.last_tick);
        if age <= TICK_INTERVAL_NANOS {
            return;
        }

        self.last_tick = now - age % TICK_INTERVAL_NANOS;
        for _ in 0..age / TICK_INTERVAL_NANOS {
            self.m1.tick();
            self.m5.tick();
            self.m15.tick();
        }
    }

    fn mean_rate(&self, now: u64) -> f64 {
        let elapsed = now.saturating_sub(self.start);
        if self.count == 0 || elapsed == 0 {
            return 0.0;
        }
        self.count as f64 / (elapsed as f64 / NANOS_PER_SEC)
    }
}
