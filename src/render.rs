//! ASCII renderings for eyeballing intermediate results.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use ndarray::Array2;

use crate::graph::{Cost, Edge};
use crate::grid::Grid;
use crate::heading::Heading;
use crate::location::Location;
use crate::region::Region;
use crate::state::State;

fn print(canvas: Array2<String>) -> String {
    let mut out = String::with_capacity(canvas.len() * 2);

    for row in canvas.rows() {
        for col in row {
            out.push_str(col);
        }
        out.push('\n');
    }

    out
}

/// Lay out `grid` with each cell in `costs` replaced by its cost, zero-padded to `width` digits.
///
/// Every column is `width + 2` characters wide; cells without a cost repeat their own character to fill the column.
pub fn costs_on_grid(grid: &Grid, costs: &BTreeMap<Location, Cost>, width: usize) -> String {
    let cells = grid.cells()
        .map(|(location, c)| match costs.get(&location) {
            Some(cost) => format!(" {cost:0width$} "),
            None => c.to_string().repeat(width + 2),
        })
        .collect();

    match Array2::from_shape_vec((grid.height(), grid.width()), cells) {
        Ok(canvas) => print(canvas),
        Err(_) => String::new(),
    }
}

/// `grid` with every cell outside `region` blanked to `.`, each row prefixed by its index.
pub fn region_mask(grid: &Grid, region: &Region) -> String {
    let mut out = String::new();
    for (y, row) in grid.rows().enumerate() {
        let _ = write!(out, "{y:03} ");
        for (x, c) in row.chars().enumerate() {
            out.push(if region.contains(Location(x as isize, y as isize)) { c } else { '.' });
        }
        out.push('\n');
    }

    out
}

/// `grid` with the route of `path` drawn over it, each cell marked by the direction it is left in and the final cell by `O`.
pub fn path_on_grid<S: State>(grid: &Grid, path: &[Edge<S>]) -> String {
    let mut marks: HashMap<Location, char> = HashMap::new();
    for edge in path {
        if let Some(heading) = Heading::direction_to(edge.from.location(), edge.to.location()) {
            marks.insert(edge.from.location(), heading.marker());
        }
        marks.entry(edge.to.location()).or_insert('O');
    }

    let mut drawn = grid.clone();
    for (location, mark) in marks {
        drawn.set(location, mark);
    }

    drawn.to_string()
}
