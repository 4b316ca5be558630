use crate::metrics::MetricKind;

/// Decides which metrics take part in a report cycle.
pub trait MetricFilter: Send + Sync {
    fn matches(&self, name: &str, kind: MetricKind) -> bool;
}

impl<F> MetricFilter for F
where
    F: Fn(&str, MetricKind) -> bool + Send + Sync,
{
    fn matches(&self, name: &str, kind: MetricKind) -> bool {
        self(name, kind)
    }
}

/// Accepts every metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllMetrics;

impl MetricFilter for AllMetrics {
    fn matches(&self, _name: &str, _kind: MetricKind) -> bool {
        true
    }
}

/// Accepts metrics whose name starts with any of the prefixes.
/// An empty prefix list accepts everything.
#[derive(Debug, Clone, Default)]
pub struct PrefixFilter {
    prefixes: Vec<String>,
}

impl PrefixFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl MetricFilter for PrefixFilter {
    fn matches(&self, name: &str, _kind: MetricKind) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}
