//! Error types.

use thiserror::Error;

use crate::agent::Category;
use crate::census::Census;

/// Invalid simulation configuration. Raised at construction, never mid-run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("total locations must be greater than zero")]
    ZeroLocations,

    #[error("total locations {0} is not a perfect square")]
    NotPerfectSquare(usize),

    #[error("a {width}x{height} grid is not square")]
    NotSquare { width: i32, height: i32 },

    #[error("configuration describes {expected} locations but the world has {actual}")]
    LocationMismatch { expected: usize, actual: usize },

    #[error("world holds {actual} but the configuration generates {expected}")]
    CensusMismatch { expected: Census, actual: Census },

    #[error("proportion for {category} must be a finite non-negative number, got {value}")]
    InvalidProportion { category: Category, value: f64 },

    #[error("proportions sum to {0}, which exceeds 1.0")]
    ProportionsExceedOne(f64),

    #[error("category {0} is listed more than once")]
    DuplicateCategory(Category),

    #[error("threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Errors surfaced by the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A relocation or tick broke a conservation rule. Indicates a defect.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
