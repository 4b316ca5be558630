pub mod clock;
pub mod meter;
pub mod registry;
pub mod reservoir;
pub mod snapshot;

use std::collections::BTreeMap;
use std::fmt;

pub use clock::{Clock, ManualClock, SystemClock};
pub use meter::Meter;
pub use registry::{Counter, Histogram, Registry, Timer, TimerContext};
pub use snapshot::{Snapshot, Statistics};

// ─── Metric kinds ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram,
    Meter,
    Timer,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
            Self::Histogram => "histogram",
            Self::Meter => "meter",
            Self::Timer => "timer",
        })
    }
}

// ─── Point-in-time values ────────────────────────────────────────

/// Whatever a gauge callback returned at report time.
#[derive(Debug, Clone, PartialEq)]
pub enum GaugeValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for GaugeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for GaugeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for GaugeValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for GaugeValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for GaugeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for GaugeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for GaugeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for GaugeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Count and rates of a meter, rates in events per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeterSnapshot {
    pub count: u64,
    pub mean_rate: f64,
    pub one_minute_rate: f64,
    pub five_minute_rate: f64,
    pub fifteen_minute_rate: f64,
}

/// Total count of a histogram plus the sample it currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub snapshot: Snapshot,
}

/// Invocation rates of a timer plus its sample of durations in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerSnapshot {
    pub rates: MeterSnapshot,
    pub durations: Snapshot,
}

// ─── Per-cycle groups ────────────────────────────────────────────

/// Everything one report cycle sees, captured at a single instant and
/// grouped by kind. Each group is ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricGroups {
    pub gauges: BTreeMap<String, GaugeValue>,
    pub counters: BTreeMap<String, i64>,
    pub histograms: BTreeMap<String, HistogramSnapshot>,
    pub meters: BTreeMap<String, MeterSnapshot>,
    pub timers: BTreeMap<String, TimerSnapshot>,
}

/// One metric borrowed from a [`MetricGroups`], tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric<'a> {
    Gauge(&'a GaugeValue),
    Counter(i64),
    Histogram(&'a HistogramSnapshot),
    Meter(&'a MeterSnapshot),
    Timer(&'a TimerSnapshot),
}

impl Metric<'_> {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Counter(_) => MetricKind::Counter,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Meter(_) => MetricKind::Meter,
            Self::Timer(_) => MetricKind::Timer,
        }
    }
}

impl MetricGroups {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.gauges.len()
            + self.counters.len()
            + self.histograms.len()
            + self.meters.len()
            + self.timers.len()
    }

    /// Gauges, counters, histograms, meters, then timers; by name within
    /// each group.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Metric<'_>)> {
        let gauges = self.gauges.iter().map(|(n, v)| (n.as_str(), Metric::Gauge(v)));
        let counters = self.counters.iter().map(|(n, c)| (n.as_str(), Metric::Counter(*c)));
        let histograms = self
            .histograms
            .iter()
            .map(|(n, h)| (n.as_str(), Metric::Histogram(h)));
        let meters = self.meters.iter().map(|(n, m)| (n.as_str(), Metric::Meter(m)));
        let timers = self.timers.iter().map(|(n, t)| (n.as_str(), Metric::Timer(t)));

        gauges.chain(counters).chain(histograms).chain(meters).chain(timers)
    }
}
