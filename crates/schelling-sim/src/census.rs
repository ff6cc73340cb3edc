//! Population census used for conservation checks and status display.

use std::collections::BTreeMap;
use std::fmt;

use crate::agent::{Agent, Category};

/// Per-category agent counts plus the number of empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    counts: BTreeMap<Category, usize>,
    empty: usize,
}

impl Census {
    /// Tally a slice of cells.
    pub fn of(cells: &[Option<Agent>]) -> Self {
        let mut census = Self::default();
        for cell in cells {
            match cell {
                Some(agent) => *census.counts.entry(agent.category()).or_default() += 1,
                None => census.empty += 1,
            }
        }
        census
    }

    /// Number of agents of `category`.
    pub fn count(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Total number of agents.
    pub fn agents(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn empty(&self) -> usize {
        self.empty
    }

    /// Total number of locations.
    pub fn locations(&self) -> usize {
        self.agents() + self.empty
    }

    /// `(category, count)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.counts.iter().map(|(&c, &n)| (c, n))
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (category, n) in self.iter() {
            write!(f, "{category}={n} ")?;
        }
        write!(f, "empty={}", self.empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_cells() {
        let cells = [
            Some(Agent::new(Category::RED)),
            None,
            Some(Agent::new(Category::BLUE)),
            Some(Agent::new(Category::RED)),
        ];
        let c = Census::of(&cells);
        assert_eq!(c.count(Category::RED), 2);
        assert_eq!(c.count(Category::BLUE), 1);
        assert_eq!(c.count(Category::GREEN), 0);
        assert_eq!(c.agents(), 3);
        assert_eq!(c.empty(), 1);
        assert_eq!(c.locations(), 4);
        assert_eq!(c.to_string(), "red=2 blue=1 empty=1");
    }

    #[test]
    fn ignores_satisfaction() {
        let mut happy = Agent::new(Category::RED);
        happy.satisfied = true;
        assert_eq!(Census::of(&[Some(happy)]), Census::of(&[Some(Agent::new(Category::RED))]));
    }
}
