use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

/// A point in world space. East is +x, north is +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Tsify)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Coordinate) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position on an area's local grid.
///
/// Cells produced by [`Coordinate`] arithmetic may fall outside the area;
/// validity is checked by the area, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Tsify)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(&self, other: Cell) -> f64 {
        f64::from(self.x - other.x).hypot(f64::from(self.y - other.y))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl Add<Cell> for Coordinate {
    type Output = Coordinate;

    fn add(self, cell: Cell) -> Coordinate {
        Coordinate::new(self.x + cell.x, self.y + cell.y)
    }
}

impl Sub for Coordinate {
    type Output = Cell;

    fn sub(self, origin: Coordinate) -> Cell {
        Cell::new(self.x - origin.x, self.y - origin.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(3, 4);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn origin_arithmetic_round_trips() {
        let origin = Coordinate::new(-7, 12);
        let cell = Cell::new(3, 2);
        let global = origin + cell;
        assert_eq!(global, Coordinate::new(-4, 14));
        assert_eq!(global - origin, cell);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Coordinate::new(2, -1).to_string(), "(2, -1)");
        assert_eq!(Cell::new(4, 0).to_string(), "(4,0)");
    }
}
