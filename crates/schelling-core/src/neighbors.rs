use crate::geom::{Point, Range};

/// Cached neighbor computation helper.
///
/// Enumerates the Moore (8-connected) neighborhood of a point, keeping only
/// positions accepted by a predicate. Positions rejected by the predicate are
/// absent, not vacant: nothing outside the grid is ever reported.
pub struct Neighbors {
    buf: Vec<Point>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return 8-directional neighbors of `p`, excluding `p` itself, keeping
    /// only those for which `keep` returns `true`.
    pub fn all(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.buf.clear();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = p.shift(dx, dy);
                if keep(n) {
                    self.buf.push(n);
                }
            }
        }
        &self.buf
    }

    /// Moore neighbors of `p` that lie inside `bounds`.
    pub fn within(&mut self, p: Point, bounds: Range) -> &[Point] {
        self.all(p, |n| bounds.contains(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_point_has_eight() {
        let mut nb = Neighbors::new();
        let ns = nb.within(Point::new(1, 1), Range::new(0, 0, 3, 3));
        assert_eq!(ns.len(), 8);
        assert!(!ns.contains(&Point::new(1, 1)));
    }

    #[test]
    fn corner_and_edge_are_clipped() {
        let mut nb = Neighbors::new();
        let bounds = Range::new(0, 0, 3, 3);
        assert_eq!(nb.within(Point::new(0, 0), bounds).len(), 3);
        assert_eq!(nb.within(Point::new(1, 0), bounds).len(), 5);
        assert_eq!(nb.within(Point::new(2, 2), bounds).len(), 3);
    }

    #[test]
    fn single_cell_grid_has_none() {
        let mut nb = Neighbors::new();
        assert!(nb.within(Point::ZERO, Range::new(0, 0, 1, 1)).is_empty());
    }
}
