//! In-place Fisher–Yates shuffle.

use rand::{Rng, RngExt};

/// Permute `items` uniformly at random using randomness from `rng` only.
///
/// Walks from the last index down, swapping each element with one drawn
/// uniformly from `[0, i]`.
pub fn fisher_yates<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn preserves_multiset() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items = vec![1, 1, 2, 3, 3, 3, 0, 0];
        let mut before = items.clone();
        fisher_yates(&mut items, &mut rng);
        before.sort();
        items.sort();
        assert_eq!(before, items);
    }

    #[test]
    fn deterministic_under_seed() {
        let mut a: Vec<u32> = (0..50).collect();
        let mut b = a.clone();
        fisher_yates(&mut a, &mut StdRng::seed_from_u64(99));
        fisher_yates(&mut b, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn trivial_lengths() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: [u8; 0] = [];
        fisher_yates(&mut empty, &mut rng);
        let mut one = [5];
        fisher_yates(&mut one, &mut rng);
        assert_eq!(one, [5]);
    }

    #[test]
    fn permutations_are_roughly_uniform() {
        // 3 elements → 6 permutations, each expected 1/6 of the time.
        let mut rng = StdRng::seed_from_u64(2024);
        let runs = 60_000;
        let mut freq: HashMap<[u8; 3], usize> = HashMap::new();
        for _ in 0..runs {
            let mut items = [0u8, 1, 2];
            fisher_yates(&mut items, &mut rng);
            *freq.entry(items).or_default() += 1;
        }
        assert_eq!(freq.len(), 6);
        let expected = runs as f64 / 6.0;
        for (perm, n) in freq {
            let deviation = (n as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "{perm:?} drawn {n} times");
        }
    }
}
