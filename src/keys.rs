use std::fmt;

/// One derived statistic a metric can contribute to the store.
///
/// The set is closed: every key written by the reporter is a metric name
/// followed by exactly one of these suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Count,
    Value,
    Mean,
    OneMinuteAverage,
    FiveMinuteAverage,
    FifteenMinuteAverage,
    Min,
    Max,
    StdDev,
    Median,
    P75,
    P95,
    P98,
    P99,
    P999,
}

impl Statistic {
    pub const ALL: [Statistic; 15] = [
        Statistic::Count,
        Statistic::Value,
        Statistic::Mean,
        Statistic::OneMinuteAverage,
        Statistic::FiveMinuteAverage,
        Statistic::FifteenMinuteAverage,
        Statistic::Min,
        Statistic::Max,
        Statistic::StdDev,
        Statistic::Median,
        Statistic::P75,
        Statistic::P95,
        Statistic::P98,
        Statistic::P99,
        Statistic::P999,
    ];

    /// The key suffix, including the leading colon.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Count => ":count",
            Self::Value => ":value",
            Self::Mean => ":mean",
            Self::OneMinuteAverage => ":one-minute-average",
            Self::FiveMinuteAverage => ":five-minute-average",
            Self::FifteenMinuteAverage => ":fifteen-minute-average",
            Self::Min => ":min",
            Self::Max => ":max",
            Self::StdDev => ":stddev",
            Self::Median => ":median",
            Self::P75 => ":75th-percentile",
            Self::P95 => ":95th-percentile",
            Self::P98 => ":98th-percentile",
            Self::P99 => ":99th-percentile",
            Self::P999 => ":999th-percentile",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Builds the store key for one statistic of one metric.
///
/// Plain concatenation: the name is neither validated nor escaped.
pub fn key_for(metric_name: &str, statistic: Statistic) -> String {
    let suffix = statistic.suffix();
    let mut key = String::with_capacity(metric_name.len() + suffix.len());
    key.push_str(metric_name);
    key.push_str(suffix);
    key
}
