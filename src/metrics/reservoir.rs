use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::snapshot::Snapshot;

/// Default number of slots, enough for a 99.9% confidence level with a
/// 5% margin of error assuming a normal distribution.
pub const DEFAULT_SIZE: usize = 1028;

/// Fixed-size uniform sample of every value ever offered
/// (Vitter's algorithm R).
pub struct UniformReservoir {
    inner: Mutex<Inner>,
}

struct Inner {
    values: Vec<i64>,
    size: usize,
    seen: u64,
    rng: StdRng,
}

impl UniformReservoir {
    pub fn new(size: usize) -> Self {
        Self::with_rng(size, StdRng::from_entropy())
    }

    /// Deterministic reservoir, used by tests.
    pub fn seeded(size: usize, seed: u64) -> Self {
        Self::with_rng(size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(size: usize, rng: StdRng) -> Self {
        let size = size.max(1);
        Self {
            inner: Mutex::new(Inner {
                values: Vec::with_capacity(size),
                size,
                seen: 0,
                rng,
            }),
        }
    }

    pub fn update(&self, value: i64) {
        let mut inner = self.inner.lock();
        inner.seen += 1;

        if inner.values.len() < inner.size {
            inner.values.push(value);
            return;
        }

        let seen = inner.seen;
        let slot = inner.rng.gen_range(0..seen);
        if slot < inner.size as u64 {
            inner.values[slot as usize] = value;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.inner.lock().values.clone())
    }
}

impl Default for UniformReservoir {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_everything_below_capacity() {
        let reservoir = UniformReservoir::seeded(16, 7);
        for v in 0..10 {
            reservoir.update(v);
        }
        assert_eq!(reservoir.snapshot().values(), &(0..10i64).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn never_grows_past_capacity() {
        let reservoir = UniformReservoir::seeded(100, 7);
        for v in 0..10_000 {
            reservoir.update(v);
        }

        let snapshot = reservoir.snapshot();
        assert_eq!(snapshot.len(), 100);
        assert!(snapshot.values().iter().all(|v| (0..10_000).contains(v)));
    }
}
