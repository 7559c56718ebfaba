//! Searches for the first change to a grid that cuts the start off from the exit.

use log::debug;

use crate::builder::{Builder, BuilderInvalidReason, PlainGridBuilder};
use crate::graph::{Cost, StateGraph, INFINITY};
use crate::location::{Dimension, Location};
use crate::solver::{Path, PathSolver, SolverFailure};

/// Reasons a blockade search may fail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BlockadeFailure {
    /// The corrupted locations do not fit the memory space.
    #[error("invalid grid: {0:?}")]
    InvalidBuilder(Vec<BuilderInvalidReason>),
    /// The search itself failed.
    #[error(transparent)]
    Solver(#[from] SolverFailure),
    /// Even with every candidate in place the exit stays reachable.
    #[error("no corrupted location blocks the exit")]
    NeverBlocked,
}

/// Find the shortest prefix length in `known_good + 1..=len` for which `is_broken` holds.
///
/// `is_broken` must be monotone: once a prefix breaks, every longer prefix does too.
/// A prefix of length `known_good` is assumed intact and never probed.
/// Returns `Ok(None)` if even the full length is intact.
pub fn first_breaking_prefix<E>(
    len: usize,
    known_good: usize,
    mut is_broken: impl FnMut(usize) -> Result<bool, E>,
) -> Result<Option<usize>, E> {
    if known_good >= len || !is_broken(len)? {
        return Ok(None);
    }

    // invariant: prefix `good` is intact and prefix `broken` is not
    let (mut good, mut broken) = (known_good, len);
    while broken - good > 1 {
        let middle = good + (broken - good) / 2;
        if is_broken(middle)? {
            broken = middle;
        } else {
            good = middle;
        }
    }

    Ok(Some(broken))
}

/// An all-open rectangular space that locations get corrupted in, one after another.
/// The route runs from the top left corner to the bottom right one.
#[derive(Copy, Clone, Debug)]
pub struct MemorySpace {
    // width, height
    dims: (Dimension, Dimension),
}

impl MemorySpace {
    /// A space of the given `(width, height)`.
    pub fn new(dims: (Dimension, Dimension)) -> Self {
        Self { dims }
    }

    /// A square space `size` cells across.
    pub fn square(size: Dimension) -> Self {
        Self::new((size, size))
    }

    /// Where the route begins: the top left corner.
    pub fn start(&self) -> Location {
        Location(0, 0)
    }

    /// Where the route ends: the bottom right corner.
    pub fn exit(&self) -> Location {
        Location(self.dims.0.get() as isize - 1, self.dims.1.get() as isize - 1)
    }

    fn graph(&self, corrupted: &[Location]) -> Result<StateGraph<Location>, BlockadeFailure> {
        PlainGridBuilder::with_dims(self.dims)
            .drop_locations(corrupted.iter().copied())
            .build()
            .map_err(|reasons| BlockadeFailure::InvalidBuilder(reasons.clone()))
    }

    /// The cheapest route to the exit with `corrupted` blocked, or [`None`] if there is none.
    pub fn escape_route(&self, corrupted: &[Location]) -> Result<Option<Path<Location>>, BlockadeFailure> {
        let graph = self.graph(corrupted)?;
        if !graph.contains(self.start()) {
            return Ok(None);
        }

        let optima = PathSolver::from(&graph).path_limit(1).solve(self.start())?;
        Ok(optima.paths_to(self.exit()).into_iter().next())
    }

    /// Number of steps to the exit with `corrupted` blocked; [`INFINITY`] if it cannot be reached.
    pub fn escape_cost(&self, corrupted: &[Location]) -> Result<Cost, BlockadeFailure> {
        let graph = self.graph(corrupted)?;
        if !graph.contains(self.start()) {
            return Ok(INFINITY);
        }

        Ok(PathSolver::from(&graph).solve(self.start())?.cost(self.exit()))
    }

    /// The first location in `corrupted` whose corruption cuts the start off from the exit, with its index.
    ///
    /// The first `known_open` locations are known not to block the exit.
    pub fn first_blocking(&self, corrupted: &[Location], known_open: usize) -> Result<(usize, Location), BlockadeFailure> {
        let prefix = first_breaking_prefix(corrupted.len(), known_open, |len| {
            let cost = self.escape_cost(&corrupted[..len])?;
            debug!("with {} corrupted the exit costs {}", len, if cost == INFINITY { "infinity".to_string() } else { cost.to_string() });
            Ok::<bool, BlockadeFailure>(cost == INFINITY)
        })?;

        // a prefix of length n is broken by its last element
        let index = prefix.ok_or(BlockadeFailure::NeverBlocked)? - 1;
        Ok((index, corrupted[index]))
    }
}
