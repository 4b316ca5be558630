/// Immutable, sorted sample of observations taken from a reservoir.
///
/// Quantiles use linear interpolation at position `q * (n + 1)` over the
/// sorted values, clamped to the first and last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: Vec<i64>,
}

/// The full statistic breakdown of one snapshot.
/// Every field is zero when the snapshot is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub stddev: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub p98: f64,
    pub p99: f64,
    pub p999: f64,
}

impl Snapshot {
    pub fn new(mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sorted view of the sample.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn min(&self) -> i64 {
        self.values.first().copied().unwrap_or(0)
    }

    pub fn max(&self) -> i64 {
        self.values.last().copied().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.values.iter().map(|&v| v as f64).sum();
        sum / self.values.len() as f64
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn stddev(&self) -> f64 {
        let n = self.values.len();
        if n <= 1 {
            return 0.0;
        }
        let mean = self.mean();
        let sum_sq: f64 = self
            .values
            .iter()
            .map(|&v| {
                let diff = v as f64 - mean;
                diff * diff
            })
            .sum();
        (sum_sq / (n - 1) as f64).sqrt()
    }

    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Value at quantile `q`; `q` is clamped to `[0, 1]`.
    pub fn quantile(&self, q: f64) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return 0.0;
        }
        let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };

        let pos = q * (n + 1) as f64;
        if pos < 1.0 {
            return self.values[0] as f64;
        }
        if pos >= n as f64 {
            return self.values[n - 1] as f64;
        }

        let index = pos.floor() as usize;
        let lower = self.values[index - 1] as f64;
        let upper = self.values[index] as f64;
        lower + (pos - pos.floor()) * (upper - lower)
    }

    pub fn statistics(&self) -> Statistics {
        if self.values.is_empty() {
            return Statistics::empty();
        }

        Statistics {
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            stddev: self.stddev(),
            median: self.median(),
            p75: self.quantile(0.75),
            p95: self.quantile(0.95),
            p98: self.quantile(0.98),
            p99: self.quantile(0.99),
            p999: self.quantile(0.999),
        }
    }
}

impl From<Vec<i64>> for Snapshot {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}

impl Statistics {
    /// All-zero placeholder reported for distributions without observations.
    pub fn empty() -> Self {
        Self {
            min: 0,
            max: 0,
            mean: 0.0,
            stddev: 0.0,
            median: 0.0,
            p75: 0.0,
            p95: 0.0,
            p98: 0.0,
            p99: 0.0,
            p999: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn one_to_ten() {
        let snapshot = Snapshot::new((1..=10).rev().collect());
        let stats = snapshot.statistics();

        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 10);
        assert_eq!(stats.mean, 5.5);
        assert_eq!(stats.median, 5.5);
        assert!((stats.stddev - 3.0276503540974917).abs() < 1e-12);
        assert!((stats.p75 - 8.25).abs() < 1e-12);
        assert_eq!(stats.p95, 10.0);
        assert_eq!(stats.p999, 10.0);
    }

    #[test]
    fn single_value() {
        let stats = Snapshot::new(vec![42]).statistics();

        assert_eq!(stats.min, 42);
        assert_eq!(stats.max, 42);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.stddev, 0.0);
        for q in [stats.median, stats.p75, stats.p95, stats.p98, stats.p99, stats.p999] {
            assert_eq!(q, 42.0);
        }
    }

    #[test]
    fn empty_is_all_zero() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.statistics(), Statistics::empty());
        assert_eq!(snapshot.quantile(0.99), 0.0);
    }

    #[test]
    fn out_of_range_quantiles_are_clamped() {
        let snapshot = Snapshot::new(vec![3, 1, 2]);
        assert_eq!(snapshot.quantile(-1.0), 1.0);
        assert_eq!(snapshot.quantile(2.0), 3.0);
        assert_eq!(snapshot.values(), &[1, 2, 3]);
    }

    proptest! {
        #[test]
        fn quantiles_are_ordered(
            values in prop::collection::vec(-1_000_000i64..1_000_000, 1..200),
        ) {
            let snapshot = Snapshot::new(values);
            let stats = snapshot.statistics();

            prop_assert!(stats.min as f64 <= stats.median);
            prop_assert!(stats.median <= stats.max as f64);

            let ranked = [stats.median, stats.p75, stats.p95, stats.p98, stats.p99, stats.p999];
            for pair in ranked.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            prop_assert!(stats.p999 <= stats.max as f64);
            prop_assert!(stats.stddev >= 0.0);
        }
    }
}
