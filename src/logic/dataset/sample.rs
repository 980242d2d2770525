//! Reproducible sampling
//!
//! Same population size + count + seed => same indices, in the same order.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Number of rows kept for a fraction (nearest integer, halves round up)
pub fn fraction_count(population: usize, fraction: f64) -> usize {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    let count = (population as f64 * fraction.min(1.0)).round() as usize;
    count.min(population)
}

/// Draw `count` distinct indices out of `population` (clamped), seeded
pub fn sample_indices(population: usize, count: usize, seed: u64) -> Vec<usize> {
    let amount = count.min(population);
    if amount == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, population, amount).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fraction_count() {
        assert_eq!(fraction_count(100, 0.25), 25);
        assert_eq!(fraction_count(10, 0.25), 3); // 2.5 rounds away from zero
        assert_eq!(fraction_count(0, 0.25), 0);
        assert_eq!(fraction_count(10, 2.0), 10);
        assert_eq!(fraction_count(10, f64::NAN), 0);
    }

    #[test]
    fn test_sample_reproducible() {
        let a = sample_indices(1000, 200, 42);
        let b = sample_indices(1000, 200, 42);
        assert_eq!(a, b);
        assert_ne!(a, sample_indices(1000, 200, 7));
    }

    #[test]
    fn test_sample_distinct_and_in_range() {
        let picked = sample_indices(50, 20, 42);
        assert_eq!(picked.len(), 20);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 20);
        assert!(picked.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_sample_clamped_to_population() {
        let picked = sample_indices(5, 200, 42);
        assert_eq!(picked.len(), 5);
        assert!(sample_indices(0, 200, 42).is_empty());
    }
}
