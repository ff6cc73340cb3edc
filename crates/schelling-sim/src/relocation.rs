//! Relocation of unsatisfied agents.
//!
//! Movers are processed in a random order. Each takes a destination drawn
//! uniformly from the vacancies still available, which is then removed from
//! the pool. Under [`VacancyPolicy::Rolling`] the vacated origin joins the
//! pool straight away, so the number of vacancies never drops and every
//! mover finds a place whenever the grid has at least one empty cell. Under
//! [`VacancyPolicy::Frozen`] only cells empty at the start of the tick are
//! destinations and movers left over once they run out stay put.

use log::trace;
use rand::{Rng, RngExt};
use schelling_core::Point;

use crate::config::VacancyPolicy;
use crate::error::Result;
use crate::shuffle::fisher_yates;
use crate::world::World;

/// Outcome of one relocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocation {
    /// `(from, to)` pairs in processing order.
    pub moves: Vec<(Point, Point)>,
    /// Movers that found no vacancy and stay unsatisfied.
    pub stranded: Vec<Point>,
}

impl Relocation {
    pub fn relocated(&self) -> usize {
        self.moves.len()
    }
}

/// Move every agent listed in `unsatisfied` to a distinct vacant cell.
///
/// `unsatisfied` must be taken before any move of this tick. Never fails for
/// lack of space; errors only signal a broken world invariant.
pub fn relocate(
    world: &mut World,
    unsatisfied: &[Point],
    policy: VacancyPolicy,
    rng: &mut impl Rng,
) -> Result<Relocation> {
    let mut order = unsatisfied.to_vec();
    fisher_yates(&mut order, rng);

    let mut vacancies = world.empty_cells();
    let mut out = Relocation::default();

    for from in order {
        if vacancies.is_empty() {
            out.stranded.push(from);
            continue;
        }
        let to = vacancies.swap_remove(rng.random_range(0..vacancies.len()));
        world.move_agent(from, to)?;
        trace!("moved agent {from} -> {to}");
        if policy == VacancyPolicy::Rolling {
            vacancies.push(from);
        }
        out.moves.push((from, to));
    }

    Ok(out)
}
