//! Grid geometry shared by the Schelling segregation engine and its viewer.
//!
//! Points and half-open ranges, an owned row-major grid and a bounds-aware
//! Moore-neighborhood helper.

pub mod geom;
pub mod grid;
pub mod neighbors;

pub use geom::{Point, Range};
pub use grid::Grid;
pub use neighbors::Neighbors;
