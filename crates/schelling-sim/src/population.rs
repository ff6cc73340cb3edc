//! Initial population generation.
//!
//! Agents are laid out category by category in declared order, followed by
//! empty markers. The caller shuffles the result before building a world.
//!
//! Counts come from cumulative rounded boundaries: the boundary after the
//! k-th category is `round(total * (p_1 + ... + p_k))` with ties rounded to
//! even, and each category fills the gap between consecutive boundaries. A
//! category's count may therefore differ from `round(p_k * total)` by one,
//! while the total number of agents always equals `round(total * sum(p))`.

use log::debug;

use crate::agent::{Agent, Category};
use crate::error::ConfigError;

/// Slack allowed on the proportion sum to absorb float noise such as
/// `0.1 + 0.2 + 0.7`.
pub const PROPORTION_EPSILON: f64 = 1e-9;

/// Check a category → proportion mapping. Returns the proportion sum.
pub fn validate_proportions(proportions: &[(Category, f64)]) -> Result<f64, ConfigError> {
    let mut sum = 0.0;
    for (i, &(category, value)) in proportions.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidProportion { category, value });
        }
        if proportions[..i].iter().any(|&(c, _)| c == category) {
            return Err(ConfigError::DuplicateCategory(category));
        }
        sum += value;
    }
    if sum > 1.0 + PROPORTION_EPSILON {
        return Err(ConfigError::ProportionsExceedOne(sum));
    }
    Ok(sum)
}

/// Cumulative boundaries: entry `k` is the index one past the last agent of
/// the k-th category.
fn boundaries(total: usize, proportions: &[(Category, f64)]) -> Vec<usize> {
    let mut cumulative = 0.0;
    proportions
        .iter()
        .map(|&(_, p)| {
            cumulative += p;
            ((total as f64 * cumulative).round_ties_even() as usize).min(total)
        })
        .collect()
}

/// Build `total_locations` entries: agents of each category in declared
/// order, then `None` for every remaining (empty) location.
pub fn generate_distribution(
    total_locations: usize,
    proportions: &[(Category, f64)],
) -> Result<Vec<Option<Agent>>, ConfigError> {
    if total_locations == 0 {
        return Err(ConfigError::ZeroLocations);
    }
    validate_proportions(proportions)?;

    let mut cells = Vec::with_capacity(total_locations);
    for (&(category, _), end) in proportions.iter().zip(boundaries(total_locations, proportions)) {
        let start = cells.len();
        cells.extend((start..end).map(|_| Some(Agent::new(category))));
        debug!("generated {} agents of {category}", end.saturating_sub(start));
    }
    cells.resize(total_locations, None);
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(cells: &[Option<Agent>], category: Category) -> usize {
        cells
            .iter()
            .filter(|c| c.is_some_and(|a| a.category() == category))
            .count()
    }

    #[test]
    fn ten_locations_quarter_quarter_half() {
        let cells =
            generate_distribution(10, &[(Category::RED, 0.25), (Category::BLUE, 0.25)]).unwrap();
        assert_eq!(cells.len(), 10);
        // Boundaries: round(2.5) = 2, round(5.0) = 5.
        for c in &cells[0..2] {
            assert_eq!(c.map(|a| a.category()), Some(Category::RED));
        }
        for c in &cells[2..5] {
            assert_eq!(c.map(|a| a.category()), Some(Category::BLUE));
        }
        assert!(cells[5..].iter().all(Option::is_none));
    }

    #[test]
    fn source_defaults() {
        let cells =
            generate_distribution(900, &[(Category::RED, 0.4), (Category::BLUE, 0.4)]).unwrap();
        assert_eq!(count(&cells, Category::RED), 360);
        assert_eq!(count(&cells, Category::BLUE), 360);
        assert_eq!(cells.iter().filter(|c| c.is_none()).count(), 180);
    }

    #[test]
    fn full_occupancy_with_float_noise() {
        let props = [
            (Category::RED, 0.1),
            (Category::BLUE, 0.2),
            (Category::GREEN, 0.7),
        ];
        let cells = generate_distribution(100, &props).unwrap();
        assert!(cells.iter().all(Option::is_some));
        assert_eq!(count(&cells, Category::GREEN), 70);
    }

    #[test]
    fn no_categories_is_all_empty() {
        let cells = generate_distribution(4, &[]).unwrap();
        assert_eq!(cells, vec![None; 4]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            generate_distribution(0, &[(Category::RED, 0.5)]),
            Err(ConfigError::ZeroLocations)
        );
        assert!(matches!(
            generate_distribution(9, &[(Category::RED, -0.1)]),
            Err(ConfigError::InvalidProportion { .. })
        ));
        assert!(matches!(
            generate_distribution(9, &[(Category::RED, f64::NAN)]),
            Err(ConfigError::InvalidProportion { .. })
        ));
        assert!(matches!(
            generate_distribution(9, &[(Category::RED, 0.6), (Category::BLUE, 0.6)]),
            Err(ConfigError::ProportionsExceedOne(_))
        ));
        assert_eq!(
            generate_distribution(9, &[(Category::RED, 0.2), (Category::RED, 0.2)]),
            Err(ConfigError::DuplicateCategory(Category::RED))
        );
    }
}
