//! The square world of cells and the grid builder.
//!
//! Neighbor access is bounds-checked rather than padded: positions off the
//! grid are absent, so the edge never offers phantom vacancies.

use schelling_core::{Grid, Point, Range};

use crate::agent::{Agent, Category};
use crate::census::Census;
use crate::error::{ConfigError, Result, SimError};

/// Side of the square grid holding `len` locations. This is the single
/// authority for the perfect-square requirement.
pub fn side_length(len: usize) -> std::result::Result<usize, ConfigError> {
    if len == 0 {
        return Err(ConfigError::ZeroLocations);
    }
    let side = len.isqrt();
    if side * side != len {
        return Err(ConfigError::NotPerfectSquare(len));
    }
    Ok(side)
}

/// Whether `(row, col)` lies inside a `size × size` grid. Same bounds test
/// as neighbor lookup.
#[inline]
pub fn is_valid_location(size: i32, row: i32, col: i32) -> bool {
    size > 0 && Range::new(0, 0, size, size).contains(Point::from_row_col(row, col))
}

/// A square grid where each cell is empty or holds exactly one [`Agent`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWorld"))]
pub struct World {
    grid: Grid<Option<Agent>>,
}

/// Wire form of a [`World`]; the grid checks its own dimensions.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWorld {
    grid: Grid<Option<Agent>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWorld> for World {
    type Error = ConfigError;

    fn try_from(raw: RawWorld) -> std::result::Result<Self, Self::Error> {
        let grid = raw.grid;
        if grid.width() != grid.height() {
            return Err(ConfigError::NotSquare {
                width: grid.width(),
                height: grid.height(),
            });
        }
        side_length(grid.len())?;
        Ok(Self { grid })
    }
}

impl World {
    /// Reshape a flat sequence into a square row-major world.
    pub fn from_cells(cells: Vec<Option<Agent>>) -> std::result::Result<Self, ConfigError> {
        let len = cells.len();
        let side = side_length(len)? as i32;
        let grid = Grid::from_vec(side, side, cells).ok_or(ConfigError::NotPerfectSquare(len))?;
        Ok(Self { grid })
    }

    /// Convenience for hand-written layouts: one entry per cell, row-major.
    pub fn from_categories(
        cells: impl IntoIterator<Item = Option<Category>>,
    ) -> std::result::Result<Self, ConfigError> {
        Self::from_cells(cells.into_iter().map(|c| c.map(Agent::new)).collect())
    }

    /// Side length `N` of the `N × N` grid.
    #[inline]
    pub fn side(&self) -> i32 {
        self.grid.width()
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.grid.bounds()
    }

    /// Total number of locations.
    #[inline]
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.grid.contains(p)
    }

    /// The agent at `p`, or `None` if the cell is empty or off the grid.
    #[inline]
    pub fn agent(&self, p: Point) -> Option<&Agent> {
        self.grid.at(p).and_then(Option::as_ref)
    }

    #[inline]
    pub fn agent_mut(&mut self, p: Point) -> Option<&mut Agent> {
        self.grid.at_mut(p).and_then(Option::as_mut)
    }

    /// Whether `p` is on the grid and vacant.
    #[inline]
    pub fn is_vacant(&self, p: Point) -> bool {
        matches!(self.grid.at(p), Some(None))
    }

    /// Occupied `(Point, &Agent)` pairs in row-major order.
    pub fn agents(&self) -> impl Iterator<Item = (Point, &Agent)> + '_ {
        self.grid.iter().filter_map(|(p, c)| c.as_ref().map(|a| (p, a)))
    }

    /// Vacant positions in row-major order.
    pub fn empty_cells(&self) -> Vec<Point> {
        self.grid.points_where(Option::is_none)
    }

    /// Occupied positions in row-major order.
    pub fn occupied_cells(&self) -> Vec<Point> {
        self.grid.points_where(Option::is_some)
    }

    /// Per-category agent counts and the number of empty cells.
    pub fn census(&self) -> Census {
        Census::of(self.grid.as_slice())
    }

    /// Move the agent at `from` into the vacant cell `to`, leaving `from`
    /// empty. Anything else is a defect and reported as an
    /// [`SimError::InvariantViolation`] with the world untouched.
    pub fn move_agent(&mut self, from: Point, to: Point) -> Result<()> {
        if from == to {
            return Err(SimError::InvariantViolation(format!(
                "agent at {from} relocated onto itself"
            )));
        }
        if !self.is_vacant(to) {
            return Err(SimError::InvariantViolation(format!(
                "destination {to} is not a vacant cell"
            )));
        }
        let agent = self
            .grid
            .at_mut(from)
            .and_then(Option::take)
            .ok_or_else(|| SimError::InvariantViolation(format!("no agent to move at {from}")))?;
        self.grid.replace(to, Some(agent));
        Ok(())
    }
}
