use serde::Deserialize;

/// Time granularity used to express rates and durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds.
    pub const fn as_nanos(self) -> u64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 3_600 * 1_000_000_000,
            Self::Days => 86_400 * 1_000_000_000,
        }
    }

    /// Lower-case plural name, e.g. `"seconds"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nanoseconds => "nanoseconds",
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

/// Rate and duration conversion applied to meter and timer statistics.
///
/// Instruments record rates in events per second and durations in
/// nanoseconds; conversion brings them to the configured units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Units {
    pub rate: TimeUnit,
    pub duration: TimeUnit,
}

impl Units {
    pub fn new(rate: TimeUnit, duration: TimeUnit) -> Self {
        Self { rate, duration }
    }

    /// Events per second → events per rate unit.
    pub fn convert_rate(&self, per_second: f64) -> f64 {
        if self.rate == TimeUnit::Seconds {
            return per_second;
        }
        per_second * self.rate.as_nanos() as f64 / TimeUnit::Seconds.as_nanos() as f64
    }

    /// Nanoseconds → duration units.
    pub fn convert_duration(&self, nanos: f64) -> f64 {
        nanos / self.duration.as_nanos() as f64
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::new(TimeUnit::Seconds, TimeUnit::Milliseconds)
    }
}
