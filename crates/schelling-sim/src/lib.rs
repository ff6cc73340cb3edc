//! Schelling segregation model: population generation, neighborhood
//! satisfaction, relocation of unsatisfied agents and the tick driver.
//!
//! The [`Simulation`] owns the [`World`] and the random source. Callers
//! advance it with [`Simulation::step`] and read the committed state through
//! [`Simulation::snapshot`] between ticks.

pub mod agent;
pub mod census;
pub mod config;
pub mod error;
pub mod population;
pub mod relocation;
pub mod satisfaction;
pub mod shuffle;
pub mod simulation;
pub mod world;

pub use agent::{Agent, Category};
pub use census::Census;
pub use config::{SimulationConfig, VacancyPolicy};
pub use error::{ConfigError, Result, SimError};
pub use population::generate_distribution;
pub use relocation::{Relocation, relocate};
pub use satisfaction::{NeighborCounts, SatisfactionEvaluator, is_satisfied};
pub use shuffle::fisher_yates;
pub use simulation::{RunState, Simulation, StepReport, build_world};
pub use world::{World, is_valid_location, side_length};
