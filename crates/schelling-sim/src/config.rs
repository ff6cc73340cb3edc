//! Simulation configuration.

use crate::agent::Category;
use crate::error::ConfigError;
use crate::population::validate_proportions;
use crate::world::side_length;

/// Which cells a relocating agent may move into during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VacancyPolicy {
    /// A cell vacated earlier in the tick is immediately available to later
    /// movers.
    #[default]
    Rolling,
    /// Only cells that were empty when the tick began are destinations.
    Frozen,
}

/// Configuration for creating a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Number of grid locations; must be a perfect square.
    pub total_locations: usize,
    /// Ordered category proportions. Whatever they leave of 1.0 is empty.
    pub proportions: Vec<(Category, f64)>,
    /// Minimum same-category neighbor fraction for satisfaction, in [0, 1].
    pub threshold: f64,
    /// Seed for the random source. `None` draws one from entropy.
    pub seed: Option<u64>,
    pub vacancy_policy: VacancyPolicy,
}

impl Default for SimulationConfig {
    /// 30 × 30 grid, 40 % red, 40 % blue, 20 % empty, threshold 0.7.
    fn default() -> Self {
        Self {
            total_locations: 900,
            proportions: vec![(Category::RED, 0.4), (Category::BLUE, 0.4)],
            threshold: 0.7,
            seed: None,
            vacancy_policy: VacancyPolicy::default(),
        }
    }
}

impl SimulationConfig {
    /// A configuration with no categories; add them with
    /// [`with_category`](Self::with_category).
    pub fn new(total_locations: usize, threshold: f64) -> Self {
        Self {
            total_locations,
            proportions: Vec::new(),
            threshold,
            ..Self::default()
        }
    }

    pub fn with_total_locations(mut self, total_locations: usize) -> Self {
        self.total_locations = total_locations;
        self
    }

    /// Append a category. Declaration order fixes the rounding order.
    pub fn with_category(mut self, category: Category, proportion: f64) -> Self {
        self.proportions.push((category, proportion));
        self
    }

    /// Replace all category proportions.
    pub fn with_proportions(mut self, proportions: Vec<(Category, f64)>) -> Self {
        self.proportions = proportions;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_vacancy_policy(mut self, policy: VacancyPolicy) -> Self {
        self.vacancy_policy = policy;
        self
    }

    /// Side length of the grid this configuration describes.
    pub fn side(&self) -> Result<usize, ConfigError> {
        side_length(self.total_locations)
    }

    /// Check every option. Called by the simulation before building a world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.side()?;
        validate_proportions(&self.proportions)?;
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}
