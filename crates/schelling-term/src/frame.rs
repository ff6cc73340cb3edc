//! Frame diffing between two screen grids.

use schelling_core::{Grid, Point};

use crate::style::Cell;

/// A single cell that changed between frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameCell {
    pub cell: Cell,
    pub pos: Point,
}

/// A set of cell changes.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub cells: Vec<FrameCell>,
    pub width: i32,
    pub height: i32,
}

/// Cells of `curr` that differ from `prev`. Positions missing from `prev`
/// count as changed.
pub fn compute_frame(prev: &Grid<Cell>, curr: &Grid<Cell>) -> Frame {
    let cells = curr
        .iter()
        .filter(|&(p, c)| prev.at(p) != Some(c))
        .map(|(pos, &cell)| FrameCell { cell, pos })
        .collect();
    Frame {
        cells,
        width: curr.width(),
        height: curr.height(),
    }
}
