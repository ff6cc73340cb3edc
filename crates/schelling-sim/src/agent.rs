//! Agents and the categories they belong to.

use std::fmt;
use std::str::FromStr;

/// The group an agent belongs to, as a small index.
///
/// The first few indices have well-known names; any other value is still a
/// valid category and displays by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category(pub u8);

impl Category {
    pub const RED: Self = Self(0);
    pub const BLUE: Self = Self(1);
    pub const GREEN: Self = Self(2);
    pub const YELLOW: Self = Self(3);

    const NAMES: [&'static str; 4] = ["red", "blue", "green", "yellow"];

    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// The well-known name, if this category has one.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMES.get(self.0 as usize).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "category {}", self.0),
        }
    }
}

/// Error returned when a category name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category \u{201c}{0}\u{201d}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Accepts a well-known name (case-insensitive) or a numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(i) = Self::NAMES.iter().position(|&n| n == lower) {
            return Ok(Self(i as u8));
        }
        lower
            .parse::<u8>()
            .map(Self)
            .map_err(|_| ParseCategoryError(s.to_string()))
    }
}

/// A single occupant of the grid.
///
/// The category never changes; `satisfied` is rewritten every tick and is
/// `false` until the first evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    category: Category,
    pub satisfied: bool,
}

impl Agent {
    pub const fn new(category: Category) -> Self {
        Self {
            category,
            satisfied: false,
        }
    }

    #[inline]
    pub const fn category(&self) -> Category {
        self.category
    }
}

impl From<Category> for Agent {
    fn from(category: Category) -> Self {
        Self::new(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_is_unsatisfied() {
        let a = Agent::new(Category::BLUE);
        assert_eq!(a.category(), Category::BLUE);
        assert!(!a.satisfied);
    }

    #[test]
    fn display_names() {
        assert_eq!(Category::RED.to_string(), "red");
        assert_eq!(Category::new(7).to_string(), "category 7");
    }

    #[test]
    fn parse_names_and_indices() {
        assert_eq!("Blue".parse::<Category>(), Ok(Category::BLUE));
        assert_eq!("3".parse::<Category>(), Ok(Category::YELLOW));
        assert_eq!("12".parse::<Category>(), Ok(Category::new(12)));
        assert!("purple".parse::<Category>().is_err());
    }
}
