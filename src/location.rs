use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Ix;

/// One grid coordinate. Signed, so neighbors may fall off the grid.
pub type Coord = isize;
/// A grid extent. Grids are never empty along either axis.
pub type Dimension = NonZero<usize>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Default)]
/// A location `(x, y)` on a grid. The top left corner is `Location(0, 0)` and `y` grows downward.
///
/// Locations double as 2D vectors; see [`add`], [`subtract`], [`scale`] and [`manhattan`].
/// They may lie outside any grid, which is how out-of-bounds neighbors are represented.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// The `(row, column)` index of this location in an [`ndarray::Array2`], if both coordinates are non-negative.
    pub(crate) fn as_index(&self) -> Option<(usize, usize)> {
        Some((usize::try_from(self.1).ok()?, usize::try_from(self.0).ok()?))
    }

    /// Shift by `(dx, dy)`.
    pub fn offset_by(self, rhs: (Coord, Coord)) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        // ndarray indices are (row, column)
        Self(value.1 as Coord, value.0 as Coord)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.0, self.1)
    }
}

/// Component-wise sum of two vectors.
pub fn add(a: Location, b: Location) -> Location {
    Location(a.0 + b.0, a.1 + b.1)
}

/// Component-wise difference `a - b`.
pub fn subtract(a: Location, b: Location) -> Location {
    Location(a.0 - b.0, a.1 - b.1)
}

/// Multiply both components by `factor`.
pub fn scale(v: Location, factor: Coord) -> Location {
    Location(v.0 * factor, v.1 * factor)
}

/// Taxicab distance between two locations.
pub fn manhattan(a: Location, b: Location) -> usize {
    let d = subtract(b, a);
    d.0.unsigned_abs() + d.1.unsigned_abs()
}
