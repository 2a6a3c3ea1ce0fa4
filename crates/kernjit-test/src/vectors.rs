//! Deterministic input vectors.
//!
//! All generators are seeded so a failing case reproduces from its seed.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator of `i32` vectors.
pub struct VectorGen {
    rng: ChaCha8Rng,
}

impl VectorGen {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// `len` values drawn uniformly from `range`.
    pub fn values(&mut self, len: usize, range: RangeInclusive<i32>) -> Vec<i32> {
        (0..len)
            .map(|_| self.rng.random_range(range.clone()))
            .collect()
    }

    /// `len` values over the full `i32` range, exercising wraparound.
    pub fn full_range(&mut self, len: usize) -> Vec<i32> {
        (0..len).map(|_| self.rng.random::<i32>()).collect()
    }

    /// `len` values from `range` that are safe as signed divisors.
    ///
    /// Excludes `0` (division by zero) and `-1` (`i32::MIN / -1` overflow).
    pub fn divisors(&mut self, len: usize, range: RangeInclusive<i32>) -> Vec<i32> {
        assert!(
            range.clone().any(|v| v != 0 && v != -1),
            "divisor range {range:?} has no safe values"
        );
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            let v = self.rng.random_range(range.clone());
            if v != 0 && v != -1 {
                out.push(v);
            }
        }
        out
    }
}
