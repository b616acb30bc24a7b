//! Planar coordinate type.
//!
//! Node coordinates only feed the A* heuristic, which scales straight-line
//! distance by a constant.  Any consistent planar unit works: abstract grid
//! units for synthetic networks, or degrees (x = longitude, y = latitude) for
//! a country-scale highway graph.

/// A 2-D coordinate in double precision.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line (Euclidean) distance.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}
