use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};

/// Time source for meters, timers and report timestamps.
pub trait Clock: Debug + Send + Sync {
    /// Monotonic nanoseconds since an arbitrary origin.
    fn tick(&self) -> u64;

    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock backed by [`Instant`] and the system wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn tick(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Clock that only moves when told to. Wall-clock time starts at the
/// Unix epoch and advances with the tick.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn tick(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.tick() as i64)
    }
}
