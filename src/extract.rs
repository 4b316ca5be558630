//! Turns one metric into the `(statistic, value)` pairs it contributes.
//!
//! Integers are rendered in plain decimal. Floats use Rust's shortest
//! round-trip form with a fractional part always present (`2.0`, `0.125`),
//! exponent form for very large or very small magnitudes (`1e20`), and
//! `NaN` / `inf` / `-inf` for non-finite values. No rounding is applied.

use crate::keys::Statistic;
use crate::metrics::{GaugeValue, HistogramSnapshot, MeterSnapshot, Metric, Snapshot, TimerSnapshot};
use crate::units::Units;

pub type Pair = (Statistic, String);

/// Dispatches to the extractor matching the metric's kind.
pub fn extract(metric: Metric<'_>, units: &Units) -> Vec<Pair> {
    match metric {
        Metric::Gauge(value) => gauge(value),
        Metric::Counter(count) => counter(count),
        Metric::Histogram(histogram) => self::histogram(histogram),
        Metric::Meter(meter) => self::meter(meter, units),
        Metric::Timer(timer) => self::timer(timer, units),
    }
}

pub fn gauge(value: &GaugeValue) -> Vec<Pair> {
    vec![(Statistic::Value, value.to_string())]
}

pub fn counter(count: i64) -> Vec<Pair> {
    vec![(Statistic::Count, count.to_string())]
}

pub fn meter(meter: &MeterSnapshot, units: &Units) -> Vec<Pair> {
    rates(meter, units)
}

pub fn histogram(histogram: &HistogramSnapshot) -> Vec<Pair> {
    let stats = histogram.snapshot.statistics();

    vec![
        (Statistic::Count, histogram.count.to_string()),
        (Statistic::Min, stats.min.to_string()),
        (Statistic::Max, stats.max.to_string()),
        (Statistic::Mean, format_float(stats.mean)),
        (Statistic::StdDev, format_float(stats.stddev)),
        (Statistic::Median, format_float(stats.median)),
        (Statistic::P75, format_float(stats.p75)),
        (Statistic::P95, format_float(stats.p95)),
        (Statistic::P98, format_float(stats.p98)),
        (Statistic::P99, format_float(stats.p99)),
        (Statistic::P999, format_float(stats.p999)),
    ]
}

/// Rate side first, then the duration distribution. Both sides produce
/// `:mean`; the duration mean comes last and is the one left in the store.
pub fn timer(timer: &TimerSnapshot, units: &Units) -> Vec<Pair> {
    let mut pairs = rates(&timer.rates, units);
    pairs.extend(durations(&timer.durations, units));
    pairs
}

fn rates(meter: &MeterSnapshot, units: &Units) -> Vec<Pair> {
    vec![
        (Statistic::Count, meter.count.to_string()),
        (Statistic::Mean, format_float(units.convert_rate(meter.mean_rate))),
        (
            Statistic::OneMinuteAverage,
            format_float(units.convert_rate(meter.one_minute_rate)),
        ),
        (
            Statistic::FiveMinuteAverage,
            format_float(units.convert_rate(meter.five_minute_rate)),
        ),
        (
            Statistic::FifteenMinuteAverage,
            format_float(units.convert_rate(meter.fifteen_minute_rate)),
        ),
    ]
}

fn durations(snapshot: &Snapshot, units: &Units) -> Vec<Pair> {
    let stats = snapshot.statistics();
    let convert = |nanos: f64| format_float(units.convert_duration(nanos));

    vec![
        (Statistic::Min, convert(stats.min as f64)),
        (Statistic::Max, convert(stats.max as f64)),
        (Statistic::Mean, convert(stats.mean)),
        (Statistic::StdDev, convert(stats.stddev)),
        (Statistic::Median, convert(stats.median)),
        (Statistic::P75, convert(stats.p75)),
        (Statistic::P95, convert(stats.p95)),
        (Statistic::P98, convert(stats.p98)),
        (Statistic::P99, convert(stats.p99)),
        (Statistic::P999, convert(stats.p999)),
    ]
}

pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}
