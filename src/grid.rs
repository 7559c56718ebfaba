use std::fmt::{Display, Formatter};
use std::num::NonZero;
use std::str::FromStr;

use ndarray::{Array2, AssignElem};

use crate::location::{Dimension, Location};

/// Reasons a grid cannot be read or queried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The input held no rows, or only empty rows.
    #[error("grid input is empty")]
    Empty,
    /// A row's width differs from the first row's.
    #[error("expected every row to be {expected} wide, but row {row} is {found} wide")]
    Ragged { row: usize, expected: usize, found: usize },
    /// The grid parsed fine but a required marker such as the start is absent.
    #[error("marker {0:?} not found in grid")]
    MarkerNotFound(char),
}

/// A rectangular grid of characters, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    // width, height
    dims: (Dimension, Dimension),
    cells: Array2<char>,
}

impl Grid {
    /// A grid of the specified dimensions, in `(x, y)` order, with every cell holding `fill`.
    pub fn filled(dims: (Dimension, Dimension), fill: char) -> Self {
        Self {
            dims,
            cells: Array2::from_elem((dims.1.get(), dims.0.get()), fill),
        }
    }

    /// Dimensions in `(x, y)` order.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// Whether `location` lies on the grid.
    pub fn contains(&self, location: Location) -> bool {
        self.get(location).is_some()
    }

    /// The character at `location`, or [`None`] if it is outside the grid.
    pub fn get(&self, location: Location) -> Option<char> {
        location.as_index().and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrite the character at `location`. Returns `false` and does nothing if it is outside the grid.
    pub fn set(&mut self, location: Location, value: char) -> bool {
        match location.as_index().and_then(|index| self.cells.get_mut(index)) {
            Some(cell) => {
                cell.assign_elem(value);
                true
            }
            None => false,
        }
    }

    /// All locations in row-major order.
    pub fn locations(&self) -> impl Iterator<Item=Location> + '_ {
        self.cells.indexed_iter().map(|(index, _)| Location::from(index))
    }

    /// All `(location, character)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item=(Location, char)> + '_ {
        self.cells.indexed_iter().map(|(index, c)| (Location::from(index), *c))
    }

    /// The first location, in row-major order, holding `marker`.
    pub fn find(&self, marker: char) -> Result<Location, GridError> {
        self.cells()
            .find(|(_, c)| *c == marker)
            .map(|(location, _)| location)
            .ok_or(GridError::MarkerNotFound(marker))
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item=String> + '_ {
        self.cells.rows().into_iter().map(|row| row.iter().collect())
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        // blank lines around the grid are ignored; one inside it is an empty, hence ragged, row
        let mut rows: Vec<Vec<char>> = input.lines()
            .map(|line| line.trim_end_matches('\r'))
            .skip_while(|line| line.is_empty())
            .map(|line| line.chars().collect())
            .collect();
        let len = rows.iter().rposition(|row| !row.is_empty()).map_or(0, |last| last + 1);
        rows.truncate(len);

        let width = rows.first().map(Vec::len).ok_or(GridError::Empty)?;
        if let Some((row, found)) = rows.iter().map(Vec::len).enumerate().find(|(_, len)| *len != width) {
            return Err(GridError::Ragged { row, expected: width, found });
        }

        let dims = (
            NonZero::new(width).ok_or(GridError::Empty)?,
            NonZero::new(rows.len()).ok_or(GridError::Empty)?,
        );
        let cells = Array2::from_shape_vec((rows.len(), width), rows.into_iter().flatten().collect())
            .map_err(|_| GridError::Empty)?;

        Ok(Self { dims, cells })
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }

        Ok(())
    }
}
