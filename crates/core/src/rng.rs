//! Deterministic seeded generator for melody synthesis.
//!
//! Implements Mulberry32, a 32-bit PRNG with a tiny state and good
//! distribution for this workload. The mixing constants are load-bearing:
//! golden-seed melody vectors depend on them, so they must not change.
//!
//! Each generator invocation owns exactly one `SeededRng`; instances are
//! never shared across calls or threads. When the caller omits a seed, one
//! is drawn from entropy once at the top level (see `melody::generate`).

/// Mulberry32 generator state.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        SeededRng { state: seed }
    }

    /// Next uniform value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        (t ^ (t >> 14)) as f64 / 4_294_967_296.0
    }

    /// Uniform value in [low, high).
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }

    /// Uniform integer in [low, high).
    pub fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        debug_assert!(low < high);
        low + (self.next_f64() * (high - low) as f64) as i32
    }

    /// Uniform index in [0, len).
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_f64() * len as f64) as usize
    }

    /// Pick a uniform element from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(43);
        assert_ne!(a.next_f64(), b.next_f64());
    }

    /// Reference values from the canonical Mulberry32 implementation.
    /// If this test breaks, the mixing constants changed and every
    /// golden-seed melody vector is invalid.
    #[test]
    fn test_golden_sequence_seed_42() {
        let mut rng = SeededRng::new(42);
        let expected = [
            0.6011037519201636,
            0.44829055899754167,
            0.8524657934904099,
            0.6697340414393693,
            0.17481389874592423,
            0.5265925421845168,
        ];
        for e in expected {
            assert!((rng.next_f64() - e).abs() < 1e-15);
        }
    }

    #[test]
    fn test_golden_sequence_seed_1() {
        let mut rng = SeededRng::new(1);
        assert!((rng.next_f64() - 0.6270739405881613).abs() < 1e-15);
        assert!((rng.next_f64() - 0.002735721180215478).abs() < 1e-15);
    }

    #[test]
    fn test_unit_range() {
        let mut rng = SeededRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_index_in_bounds() {
        let mut rng = SeededRng::new(9);
        for _ in 0..10_000 {
            assert!(rng.index(5) < 5);
        }
    }

    #[test]
    fn test_range_i32_bounds() {
        let mut rng = SeededRng::new(11);
        for _ in 0..10_000 {
            let v = rng.range_i32(-1, 2);
            assert!((-1..2).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SeededRng::new(3);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }
}
