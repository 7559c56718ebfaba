use itertools::Itertools;
use strum::VariantArray;

use crate::location::{scale, Coord, Location};

/// One of the four orthogonal unit directions on a square grid.
///
/// [`VARIANTS`](VariantArray::VARIANTS) lists them clockwise starting from [`North`](Heading::North),
/// which is the order facing states are generated in.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Heading {
    /// Up, toward row 0.
    North,
    /// Right.
    East,
    /// Down.
    South,
    /// Left.
    West,
}

impl Heading {
    /// The order in which plain grid adjacency is enumerated: up, down, left, right.
    ///
    /// Edge insertion order follows this, so tie-breaking between equal-cost paths depends on it.
    pub const ADJACENCY_ORDER: &'static [Self] = &[Self::North, Self::South, Self::West, Self::East];

    /// The unit vector of this heading.
    pub fn offset(&self) -> Location {
        match self {
            Self::North => Location(0, -1),
            Self::East => Location(1, 0),
            Self::South => Location(0, 1),
            Self::West => Location(-1, 0),
        }
    }

    /// Take `distance` steps from `location` in this direction.
    pub fn advance(&self, location: Location, distance: Coord) -> Location {
        let Location(dx, dy) = scale(self.offset(), distance);
        location.offset_by((dx, dy))
    }

    /// Take a single step from `location` in this direction.
    pub fn attempt_from(&self, location: Location) -> Location {
        self.advance(location, 1)
    }

    /// Rotate 90 degrees clockwise, as seen on screen with `y` growing downward.
    pub fn clockwise(&self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn counter_clockwise(&self) -> Self {
        self.clockwise().invert()
    }

    /// The opposite heading.
    pub fn invert(&self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Parse the arrow glyphs `^`, `>`, `v` and `<`.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '^' => Some(Self::North),
            '>' => Some(Self::East),
            'v' => Some(Self::South),
            '<' => Some(Self::West),
            _ => None,
        }
    }

    /// The arrow glyph for this heading.
    pub fn marker(&self) -> char {
        match self {
            Self::North => '^',
            Self::East => '>',
            Self::South => 'v',
            Self::West => '<',
        }
    }

    /// Every orthogonal neighbor of `location`, in [`ADJACENCY_ORDER`](Self::ADJACENCY_ORDER).
    ///
    /// Neighbors are computed in "theory" and may be outside any grid.
    pub fn neighbors_of(location: Location) -> Vec<(Self, Location)> {
        Self::ADJACENCY_ORDER.iter()
            .map(|dir| (*dir, dir.attempt_from(location)))
            .collect_vec()
    }

    /// Determine the direction from `a` to `b`, if they are orthogonally adjacent.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == b).copied()
    }
}
