//! The tick driver.
//!
//! A tick runs start to finish inside [`Simulation::step`]: every occupied
//! cell is evaluated against the grid as it stood when the tick began, the
//! results are written into the agents, and only then are the unsatisfied
//! agents relocated. Readers borrow the world through
//! [`Simulation::snapshot`], which the borrow checker keeps out of a tick in
//! progress.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schelling_core::Point;

use crate::census::Census;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, Result, SimError};
use crate::population::generate_distribution;
use crate::relocation::relocate;
use crate::satisfaction::SatisfactionEvaluator;
use crate::shuffle::fisher_yates;
use crate::world::World;

/// Where a run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// Built, no tick taken yet.
    Initialized,
    /// The last tick moved at least one agent.
    Running,
    /// The last tick moved nobody. Further ticks change nothing.
    Converged,
}

/// Summary of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    /// 1-based number of the tick just completed.
    pub tick: u64,
    /// Agents evaluated (every occupied cell).
    pub evaluated: usize,
    /// Agents found unsatisfied at the start of the tick.
    pub unsatisfied: usize,
    /// `(from, to)` pairs of the agents moved.
    pub moves: Vec<(Point, Point)>,
    /// Unsatisfied agents left in place for lack of a vacancy.
    pub stranded: usize,
    pub converged: bool,
}

impl StepReport {
    pub fn relocated(&self) -> usize {
        self.moves.len()
    }
}

/// Generate, shuffle and lay out the initial population.
pub fn build_world(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> std::result::Result<World, ConfigError> {
    let mut cells = generate_distribution(config.total_locations, &config.proportions)?;
    fisher_yates(&mut cells, rng);
    World::from_cells(cells)
}

/// Owns the world and the random source and advances them tick by tick.
pub struct Simulation<R: Rng = StdRng> {
    config: SimulationConfig,
    world: World,
    rng: R,
    evaluator: SatisfactionEvaluator,
    census: Census,
    seed: Option<u64>,
    tick: u64,
    state: RunState,
    last_report: Option<StepReport>,
}

impl Simulation<StdRng> {
    /// Create a simulation from `config`, seeding the random source from
    /// `config.seed` or from entropy.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::seeded(config)
    }
}

impl<R: Rng + SeedableRng> Simulation<R> {
    /// Like [`Simulation::new`] for any seedable generator.
    pub fn seeded(config: SimulationConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| rand::random());
        let mut sim = Self::with_rng(config, R::seed_from_u64(seed))?;
        sim.seed = Some(seed);
        Ok(sim)
    }

    /// Rebuild the world from the configuration and its seed. An unseeded
    /// configuration yields a fresh world.
    pub fn reset(&mut self) -> Result<()> {
        let seed = self.config.seed;
        self.reset_with_seed(seed)
    }

    /// Rebuild the world with `seed`, or a fresh random seed for `None`.
    pub fn reset_with_seed(&mut self, seed: Option<u64>) -> Result<()> {
        let seed = seed.unwrap_or_else(|| rand::random());
        let mut rng = R::seed_from_u64(seed);
        self.world = build_world(&self.config, &mut rng)?;
        self.rng = rng;
        self.census = self.world.census();
        self.seed = Some(seed);
        self.tick = 0;
        self.state = RunState::Initialized;
        self.last_report = None;
        info!("reset world with seed {seed}: {}", self.census);
        Ok(())
    }
}

impl<R: Rng> Simulation<R> {
    /// Create a simulation drawing all randomness from `rng`.
    pub fn with_rng(config: SimulationConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let world = build_world(&config, &mut rng)?;
        let census = world.census();
        info!(
            "initialized {}x{} world, threshold {}: {census}",
            world.side(),
            world.side(),
            config.threshold
        );
        Ok(Self {
            evaluator: SatisfactionEvaluator::new(config.threshold),
            config,
            world,
            rng,
            census,
            seed: None,
            tick: 0,
            state: RunState::Initialized,
            last_report: None,
        })
    }

    /// Run on a prepared world instead of a generated one.
    ///
    /// The configuration must describe `world`: same number of locations and
    /// the census its proportions generate. That keeps [`reset`](Self::reset)
    /// rebuilding a world of the same size and composition.
    pub fn from_world(config: SimulationConfig, world: World, rng: R) -> Result<Self> {
        config.validate()?;
        if world.len() != config.total_locations {
            return Err(ConfigError::LocationMismatch {
                expected: config.total_locations,
                actual: world.len(),
            }
            .into());
        }
        let expected = Census::of(&generate_distribution(
            config.total_locations,
            &config.proportions,
        )?);
        if world.census() != expected {
            return Err(ConfigError::CensusMismatch {
                expected,
                actual: world.census(),
            }
            .into());
        }
        let census = world.census();
        Ok(Self {
            evaluator: SatisfactionEvaluator::new(config.threshold),
            config,
            world,
            rng,
            census,
            seed: None,
            tick: 0,
            state: RunState::Initialized,
            last_report: None,
        })
    }

    /// Advance exactly one tick: evaluate every agent, then relocate the
    /// unsatisfied ones.
    pub fn step(&mut self) -> Result<StepReport> {
        let verdicts: Vec<(Point, bool)> = self
            .world
            .occupied_cells()
            .into_iter()
            .map(|p| (p, self.evaluator.evaluate(&self.world, p)))
            .collect();

        let mut unsatisfied = Vec::new();
        for &(p, satisfied) in &verdicts {
            if let Some(agent) = self.world.agent_mut(p) {
                agent.satisfied = satisfied;
            }
            if !satisfied {
                unsatisfied.push(p);
            }
        }

        let relocation = relocate(
            &mut self.world,
            &unsatisfied,
            self.config.vacancy_policy,
            &mut self.rng,
        )?;
        self.check_conservation()?;

        self.tick += 1;
        let converged = relocation.moves.is_empty();
        let report = StepReport {
            tick: self.tick,
            evaluated: verdicts.len(),
            unsatisfied: unsatisfied.len(),
            stranded: relocation.stranded.len(),
            moves: relocation.moves,
            converged,
        };

        debug!(
            "tick {}: {} evaluated, {} unsatisfied, {} relocated",
            report.tick,
            report.evaluated,
            report.unsatisfied,
            report.relocated()
        );
        if converged && report.stranded > 0 {
            warn!(
                "tick {}: {} unsatisfied agents have no vacancy to move to",
                report.tick, report.stranded
            );
        }
        if converged && self.state != RunState::Converged {
            info!("converged after {} ticks", self.tick);
        }
        self.state = if converged {
            RunState::Converged
        } else {
            RunState::Running
        };
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Step until a tick moves nobody or `max_ticks` ticks have run.
    /// Returns the converging tick, if any.
    pub fn run_until_converged(&mut self, max_ticks: u64) -> Result<Option<u64>> {
        for _ in 0..max_ticks {
            let report = self.step()?;
            if report.converged {
                return Ok(Some(report.tick));
            }
        }
        Ok(None)
    }

    fn check_conservation(&self) -> Result<()> {
        let now = self.world.census();
        if now != self.census {
            return Err(SimError::InvariantViolation(format!(
                "census changed during tick {}: {} became {now}",
                self.tick + 1,
                self.census
            )));
        }
        Ok(())
    }

    /// The committed world. Clone it to hand it to another thread.
    #[inline]
    pub fn snapshot(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The census taken at initialization, which every tick preserves.
    #[inline]
    pub fn census(&self) -> &Census {
        &self.census
    }

    /// Number of ticks completed since initialization or reset.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn is_converged(&self) -> bool {
        self.state == RunState::Converged
    }

    /// Seed the random source was built from, when known.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    /// Mean same-category neighbor ratio of the committed world.
    pub fn similarity(&self) -> Option<f64> {
        SatisfactionEvaluator::new(self.config.threshold).similarity(&self.world)
    }

    /// Number of agents flagged satisfied by the last evaluation.
    pub fn satisfied_count(&self) -> usize {
        self.world.agents().filter(|(_, a)| a.satisfied).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Category;
    use crate::config::VacancyPolicy;
    use crate::satisfaction::is_satisfied;

    const R: Option<Category> = Some(Category::RED);
    const B: Option<Category> = Some(Category::BLUE);
    const E: Option<Category> = None;

    fn seeded(config: SimulationConfig) -> Simulation {
        Simulation::new(config).unwrap()
    }

    #[test]
    fn new_validates_config() {
        let bad = SimulationConfig::default().with_total_locations(50);
        assert!(matches!(
            Simulation::new(bad),
            Err(SimError::Config(ConfigError::NotPerfectSquare(50)))
        ));
    }

    #[test]
    fn initial_state() {
        let sim = seeded(SimulationConfig::default().with_seed(1));
        assert_eq!(sim.state(), RunState::Initialized);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.seed(), Some(1));
        assert_eq!(sim.snapshot().side(), 30);
        assert_eq!(sim.census().count(Category::RED), 360);
        assert_eq!(sim.census().empty(), 180);
        assert_eq!(sim.satisfied_count(), 0);
    }

    #[test]
    fn single_agent_is_converged_and_stays_so() {
        let config = SimulationConfig::new(25, 0.9)
            .with_category(Category::RED, 0.04)
            .with_seed(3);
        let mut sim = seeded(config);
        let before = sim.snapshot().clone();
        for tick in 1..=3 {
            let report = sim.step().unwrap();
            assert_eq!(report.tick, tick);
            assert_eq!(report.evaluated, 1);
            assert!(report.converged);
            assert_eq!(sim.satisfied_count(), 1);
        }
        assert!(sim.is_converged());
        assert_eq!(sim.snapshot().occupied_cells(), before.occupied_cells());
    }

    #[test]
    fn degenerate_worlds_converge_immediately() {
        let empty = SimulationConfig::new(9, 0.5).with_seed(0);
        let same = SimulationConfig::new(9, 1.0)
            .with_category(Category::BLUE, 0.5)
            .with_seed(0);
        let full_one = SimulationConfig::new(16, 1.0)
            .with_category(Category::RED, 1.0)
            .with_seed(0);
        for config in [empty, same, full_one] {
            let mut sim = seeded(config);
            let report = sim.step().unwrap();
            assert!(report.converged);
            assert_eq!(report.unsatisfied, 0);
        }
    }

    #[test]
    fn flags_reflect_start_of_tick() {
        let config = SimulationConfig::default().with_total_locations(100).with_seed(8);
        let mut sim = seeded(config);
        let before = sim.snapshot().clone();
        let report = sim.step().unwrap();
        assert!(report.relocated() > 0);
        let threshold = sim.config().threshold;
        let after = sim.snapshot();
        for (from, to) in &report.moves {
            assert!(!is_satisfied(&before, *from, threshold));
            assert!(!after.agent(*to).unwrap().satisfied);
        }
        for (p, _) in before.agents() {
            if report.moves.iter().any(|(from, _)| *from == p) {
                continue;
            }
            assert_eq!(after.agent(p).unwrap().satisfied, is_satisfied(&before, p, threshold));
        }
    }

    #[test]
    fn identical_seeds_give_identical_runs() {
        let config = SimulationConfig::default().with_seed(77);
        let mut a = seeded(config.clone());
        let mut b = seeded(config);
        for _ in 0..5 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn converges_on_easy_threshold() {
        let config = SimulationConfig::default()
            .with_total_locations(400)
            .with_threshold(0.3)
            .with_seed(12);
        let mut sim = seeded(config);
        let start = sim.similarity().unwrap();
        let tick = sim.run_until_converged(3_000).unwrap();
        assert!(tick.is_some());
        assert!(sim.similarity().unwrap() >= start);
        let frozen = sim.snapshot().clone();
        let again = sim.step().unwrap();
        assert!(again.converged);
        assert_eq!(sim.snapshot(), &frozen);
    }

    #[test]
    fn full_grid_stalls_without_error() {
        // Checkerboard with no vacancies: everyone is unhappy, nobody can move.
        let world = World::from_categories([R, B, R, B, R, B, R, B, R]).unwrap();
        let config = SimulationConfig::new(9, 0.9)
            .with_category(Category::RED, 5.0 / 9.0)
            .with_category(Category::BLUE, 4.0 / 9.0);
        let mut sim = Simulation::from_world(config, world, StdRng::seed_from_u64(4)).unwrap();
        let report = sim.step().unwrap();
        assert_eq!(report.unsatisfied, 9);
        assert_eq!(report.stranded, 9);
        assert!(report.converged);
    }

    #[test]
    fn frozen_policy_keeps_counts() {
        let world = World::from_categories([R, B, R, E, B, E, R, B, E]).unwrap();
        let config = SimulationConfig::new(9, 1.0)
            .with_category(Category::RED, 1.0 / 3.0)
            .with_category(Category::BLUE, 1.0 / 3.0)
            .with_vacancy_policy(VacancyPolicy::Frozen);
        let mut sim = Simulation::from_world(config, world, StdRng::seed_from_u64(6)).unwrap();
        let census = sim.census().clone();
        for _ in 0..10 {
            let report = sim.step().unwrap();
            assert!(report.relocated() <= 3);
            assert_eq!(&sim.snapshot().census(), &census);
        }
    }

    #[test]
    fn from_world_requires_matching_config() {
        let world = World::from_categories([R, B, R, B, E, B, R, B, R]).unwrap();
        let rng = || StdRng::seed_from_u64(2);

        let wrong_size = SimulationConfig::new(16, 0.5)
            .with_category(Category::RED, 0.25)
            .with_category(Category::BLUE, 0.25);
        assert!(matches!(
            Simulation::from_world(wrong_size, world.clone(), rng()),
            Err(SimError::Config(ConfigError::LocationMismatch {
                expected: 16,
                actual: 9
            }))
        ));

        let bad_proportion = SimulationConfig::new(9, 0.5).with_category(Category::RED, 5.0);
        assert!(matches!(
            Simulation::from_world(bad_proportion, world.clone(), rng()),
            Err(SimError::Config(ConfigError::ProportionsExceedOne(_)))
        ));

        let wrong_mix = SimulationConfig::new(9, 0.5)
            .with_category(Category::RED, 0.5)
            .with_category(Category::BLUE, 0.5);
        assert!(matches!(
            Simulation::from_world(wrong_mix, world, rng()),
            Err(SimError::Config(ConfigError::CensusMismatch { .. }))
        ));
    }

    #[test]
    fn reset_after_from_world_keeps_size_and_mix() {
        let world = World::from_categories([R, B, R, B, E, B, R, B, R]).unwrap();
        let config = SimulationConfig::new(9, 0.5)
            .with_category(Category::RED, 4.0 / 9.0)
            .with_category(Category::BLUE, 4.0 / 9.0)
            .with_seed(5);
        let census = world.census();
        let mut sim = Simulation::from_world(config, world, StdRng::seed_from_u64(5)).unwrap();
        sim.step().unwrap();
        sim.reset().unwrap();
        assert_eq!(sim.snapshot().side(), 3);
        assert_eq!(sim.snapshot().census(), census);
        assert_eq!(sim.census(), &census);
    }

    #[test]
    fn reset_with_same_seed_replays() {
        let mut sim = seeded(SimulationConfig::default().with_seed(21));
        let initial = sim.snapshot().clone();
        sim.step().unwrap();
        sim.reset().unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.state(), RunState::Initialized);
        assert_eq!(sim.snapshot(), &initial);
        sim.reset_with_seed(Some(22)).unwrap();
        assert_eq!(sim.seed(), Some(22));
        assert_eq!(sim.snapshot().census(), initial.census());
    }
}
