//! Neighborhood satisfaction.
//!
//! An agent looks at its in-bounds Moore neighborhood. With no occupied
//! neighbors it is satisfied; otherwise it is satisfied when the fraction of
//! occupied neighbors sharing its category reaches the threshold. The
//! fraction is a real-valued ratio, never an integer quotient.

use schelling_core::{Neighbors, Point};

use crate::world::World;

/// Occupancy of an agent's Moore neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborCounts {
    /// Occupied in-bounds neighbors.
    pub occupied: usize,
    /// Occupied neighbors sharing the subject's category.
    pub same: usize,
}

impl NeighborCounts {
    /// Same-category fraction, or `None` without occupied neighbors.
    pub fn ratio(self) -> Option<f64> {
        (self.occupied > 0).then(|| self.same as f64 / self.occupied as f64)
    }

    /// Satisfaction under `threshold`.
    pub fn satisfies(self, threshold: f64) -> bool {
        self.ratio().is_none_or(|r| r >= threshold)
    }
}

/// Evaluates agents against a fixed threshold, reusing its neighbor buffer
/// across calls.
pub struct SatisfactionEvaluator {
    threshold: f64,
    neighbors: Neighbors,
}

impl SatisfactionEvaluator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            neighbors: Neighbors::new(),
        }
    }

    /// Neighborhood counts around `p`, or `None` if `p` holds no agent.
    pub fn counts(&mut self, world: &World, p: Point) -> Option<NeighborCounts> {
        let subject = world.agent(p)?.category();
        let mut counts = NeighborCounts::default();
        for &n in self.neighbors.within(p, world.bounds()) {
            if let Some(other) = world.agent(n) {
                counts.occupied += 1;
                if other.category() == subject {
                    counts.same += 1;
                }
            }
        }
        Some(counts)
    }

    /// Whether the agent at `p` is satisfied. Empty cells report `false`.
    pub fn evaluate(&mut self, world: &World, p: Point) -> bool {
        let threshold = self.threshold;
        self.counts(world, p)
            .is_some_and(|c| c.satisfies(threshold))
    }

    /// Mean same-category ratio over agents with at least one occupied
    /// neighbor. `None` when no agent has a neighbor.
    pub fn similarity(&mut self, world: &World) -> Option<f64> {
        let (mut total, mut n) = (0.0, 0usize);
        for p in world.occupied_cells() {
            if let Some(r) = self.counts(world, p).and_then(NeighborCounts::ratio) {
                total += r;
                n += 1;
            }
        }
        (n > 0).then(|| total / n as f64)
    }
}

/// Whether the agent at `p` is satisfied under `threshold`.
pub fn is_satisfied(world: &World, p: Point, threshold: f64) -> bool {
    SatisfactionEvaluator::new(threshold).evaluate(world, p)
}
