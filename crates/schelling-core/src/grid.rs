//! The owned, row-major [`Grid`].
//!
//! Unlike a shared-buffer view, a `Grid` owns its cells: cloning it yields an
//! independent copy, which is what readers on another thread should receive.

use crate::geom::{Point, Range};

/// A 2D grid of `T` values stored row-major.
///
/// Deserialization goes through [`Grid::from_vec`], so a payload whose cell
/// count does not match its dimensions is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGrid<T>"))]
pub struct Grid<T> {
    cells: Vec<T>,
    width: i32,
    height: i32,
}

/// Unchecked wire form of a [`Grid`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid<T> {
    cells: Vec<T>,
    width: i32,
    height: i32,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = String;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        let RawGrid {
            cells,
            width,
            height,
        } = raw;
        let len = cells.len();
        Self::from_vec(width, height, cells)
            .ok_or_else(|| format!("{len} cells do not fill a {width}x{height} grid"))
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Create a new grid of the given dimensions, filled with `T::default()`.
    pub fn new(width: i32, height: i32) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            cells: vec![T::default(); (w as usize) * (h as usize)],
            width: w,
            height: h,
        }
    }
}

impl<T> Grid<T> {
    /// Wrap a row-major vector. Returns `None` unless
    /// `cells.len() == width * height`.
    pub fn from_vec(width: i32, height: i32, cells: Vec<T>) -> Option<Self> {
        if width < 0 || height < 0 || cells.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            cells,
            width,
            height,
        })
    }

    /// The bounding range of this grid, anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    /// Size of the grid as a `Point`.
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` is inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some((p.y as usize) * (self.width as usize) + (p.x as usize))
        } else {
            None
        }
    }

    /// Borrow the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<&T> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Mutably borrow the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at_mut(&mut self, p: Point) -> Option<&mut T> {
        self.index(p).map(|i| &mut self.cells[i])
    }

    /// Replace the cell at `p`, returning the previous value. Returns `None`
    /// and leaves the grid untouched if `p` is out of bounds.
    pub fn replace(&mut self, p: Point, value: T) -> Option<T> {
        let i = self.index(p)?;
        Some(std::mem::replace(&mut self.cells[i], value))
    }

    /// Set the cell at `p`. No-op if `p` is outside bounds.
    pub fn set(&mut self, p: Point, value: T) {
        if let Some(i) = self.index(p) {
            self.cells[i] = value;
        }
    }

    /// Fill every cell with `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.cells.fill(value);
    }

    /// Row-major iterator over `(Point, &T)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.bounds().iter().zip(self.cells.iter())
    }

    /// Points of every cell satisfying `f`, in row-major order.
    pub fn points_where(&self, mut f: impl FnMut(&T) -> bool) -> Vec<Point> {
        self.iter().filter(|(_, c)| f(*c)).map(|(p, _)| p).collect()
    }

    /// Count how many cells satisfy a predicate.
    pub fn count_fn(&self, mut f: impl FnMut(Point, &T) -> bool) -> usize {
        self.iter().filter(|(p, c)| f(*p, *c)).count()
    }

    /// The cells as a row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}
