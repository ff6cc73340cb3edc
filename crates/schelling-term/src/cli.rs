//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use schelling_sim::{Category, SimulationConfig, VacancyPolicy};

/// Schelling segregation model in the terminal
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "schelling", version)]
#[command(about = "Watch a Schelling segregation model settle in the terminal")]
pub struct Args {
    /// Number of grid locations (a perfect square)
    #[arg(long, default_value_t = 900)]
    pub locations: usize,

    /// Category share as NAME=PROPORTION, repeatable; order fixes rounding
    #[arg(
        long = "category",
        value_name = "NAME=PROPORTION",
        value_parser = parse_category,
        default_values = ["red=0.4", "blue=0.4"]
    )]
    pub categories: Vec<(Category, f64)>,

    /// Minimum fraction of same-category neighbors for an agent to stay
    #[arg(long, default_value_t = 0.7)]
    pub threshold: f64,

    /// Random seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Which cells movers may take during a tick
    #[arg(long, value_enum, default_value_t = Vacancy::Rolling)]
    pub vacancy: Vacancy,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 450)]
    pub interval_ms: u64,

    /// Run without the terminal UI, printing one line per tick
    #[arg(long)]
    pub headless: bool,

    /// Maximum ticks in headless mode
    #[arg(long, default_value_t = 1000)]
    pub ticks: u64,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Command-line spelling of [`VacancyPolicy`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vacancy {
    /// Cells vacated earlier in a tick can be taken by later movers
    Rolling,
    /// Only cells empty at the start of a tick can be taken
    Frozen,
}

impl From<Vacancy> for VacancyPolicy {
    fn from(v: Vacancy) -> Self {
        match v {
            Vacancy::Rolling => VacancyPolicy::Rolling,
            Vacancy::Frozen => VacancyPolicy::Frozen,
        }
    }
}

fn parse_category(s: &str) -> Result<(Category, f64), String> {
    let (name, proportion) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PROPORTION, got `{s}`"))?;
    let category = name.trim().parse::<Category>().map_err(|e| e.to_string())?;
    let proportion = proportion
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad proportion `{proportion}`: {e}"))?;
    Ok((category, proportion))
}

impl Args {
    /// The simulation configuration these arguments describe. Validation is
    /// left to the simulation.
    pub fn simulation_config(&self) -> SimulationConfig {
        let config = SimulationConfig::new(self.locations, self.threshold)
            .with_proportions(self.categories.clone())
            .with_vacancy_policy(self.vacancy.into());
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
