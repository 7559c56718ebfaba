//! Connected regions of equal cells, their fence metrics, and path counting on acyclic graphs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace};
use petgraph::visit::DfsPostOrder;

use crate::graph::StateGraph;
use crate::grid::Grid;
use crate::heading::Heading;
use crate::location::{add, Location};
use crate::state::State;

/// A maximal 4-connected set of cells sharing a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    label: char,
    members: BTreeSet<Location>,
}

/// Which corner of its cell a corner point is.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum CornerType {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CornerType {
    fn is_diagonal_to(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::TopLeft, Self::BottomRight)
                | (Self::BottomRight, Self::TopLeft)
                | (Self::TopRight, Self::BottomLeft)
                | (Self::BottomLeft, Self::TopRight)
        )
    }
}

impl Region {
    /// The character shared by every member.
    pub fn label(&self) -> char {
        self.label
    }

    /// Member cells, ordered.
    pub fn members(&self) -> &BTreeSet<Location> {
        &self.members
    }

    /// Whether `location` belongs to the region.
    pub fn contains(&self, location: Location) -> bool {
        self.members.contains(&location)
    }

    /// Number of member cells.
    pub fn area(&self) -> usize {
        self.members.len()
    }

    /// Count of `(member, direction)` pairs whose neighbor is outside the region.
    ///
    /// Neighbors off the grid are outside the region too, so the outer boundary counts.
    /// Holes count as well.
    pub fn perimeter(&self) -> usize {
        self.members.iter()
            .flat_map(|member| Heading::neighbors_of(*member))
            .filter(|(_, neighbor)| !self.contains(*neighbor))
            .count()
    }

    /// Like [`Self::perimeter`], but only borders against other cells of `grid` count, not the grid's own edge.
    pub fn perimeter_within(&self, grid: &Grid) -> usize {
        self.members.iter()
            .flat_map(|member| Heading::neighbors_of(*member))
            .filter(|(_, neighbor)| grid.contains(*neighbor) && !self.contains(*neighbor))
            .count()
    }

    /// Number of corners of the region's outline, which equals its number of straight sides.
    ///
    /// Every member cell contributes its four corner points.
    /// A point used by one or three member cells is a corner.
    /// A point used by two cells is a straight edge, unless the two touch only diagonally, in which case it is two corners.
    /// A point used by four cells is interior.
    pub fn corners(&self) -> usize {
        self.members.iter()
            .flat_map(|cell| [
                (*cell, CornerType::TopLeft),
                (add(*cell, Location(1, 0)), CornerType::TopRight),
                (add(*cell, Location(0, 1)), CornerType::BottomLeft),
                (add(*cell, Location(1, 1)), CornerType::BottomRight),
            ])
            .into_group_map()
            .values()
            .map(|types| match types.as_slice() {
                [_] | [_, _, _] => 1,
                [a, b] if a.is_diagonal_to(b) => 2,
                _ => 0,
            })
            .sum()
    }

    /// Area times perimeter.
    pub fn fence_price(&self) -> usize {
        self.area() * self.perimeter()
    }

    /// Area times number of sides.
    pub fn bulk_price(&self) -> usize {
        self.area() * self.corners()
    }
}

/// Flood-fill the region containing `seed`, or [`None`] if `seed` is off the grid.
///
/// The traversal uses an explicit stack; the resulting set is the same from any seed inside the region.
pub fn extract_region(grid: &Grid, seed: Location) -> Option<Region> {
    let label = grid.get(seed)?;
    let mut members = BTreeSet::new();
    let mut stack = vec![seed];

    while let Some(current) = stack.pop() {
        if !members.insert(current) {
            continue;
        }

        for (_, neighbor) in Heading::neighbors_of(current) {
            if grid.get(neighbor) == Some(label) && !members.contains(&neighbor) {
                stack.push(neighbor);
            }
        }
    }

    trace!("region {:?} from {} has {} cells", label, seed, members.len());

    Some(Region { label, members })
}

/// Yields every region of a grid exactly once, seeding from the first unvisited cell in row-major order.
pub struct RegionExtractor<'a> {
    grid: &'a Grid,
    visited: HashSet<Location>,
    pending: std::vec::IntoIter<Location>,
}

impl<'a> RegionExtractor<'a> {
    /// An extractor over every cell of `grid`.
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            visited: HashSet::with_capacity(grid.width() * grid.height()),
            pending: grid.locations().collect_vec().into_iter(),
        }
    }
}

impl Iterator for RegionExtractor<'_> {
    type Item = Region;

    fn next(&mut self) -> Option<Self::Item> {
        let seed = self.pending.find(|location| !self.visited.contains(location))?;
        let region = extract_region(self.grid, seed)?;
        self.visited.extend(region.members.iter().copied());
        Some(region)
    }
}

/// Every region of `grid`, in order of their first cell.
pub fn regions(grid: &Grid) -> Vec<Region> {
    let found = RegionExtractor::new(grid).collect_vec();
    debug!("found {} regions in a {}x{} grid", found.len(), grid.width(), grid.height());
    found
}

/// A state graph that was required to be acyclic has a cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("state graph has a cycle through {0}")]
pub struct CycleDetected(pub Location);

/// Count, for each state reachable from `start` that matches `is_end`, how many distinct paths lead to it from `start`.
///
/// The reachable part of `graph` must be acyclic; otherwise the counts are unbounded and [`CycleDetected`] names a state on a cycle.
/// Counts are accumulated along a topological order, so the running time is linear in the reachable part of the graph.
pub fn reachable_ends<S: State>(
    graph: &StateGraph<S>,
    start: S,
    is_end: impl Fn(&S) -> bool,
) -> Result<BTreeMap<S, usize>, CycleDetected> {
    let mut ends = BTreeMap::new();
    if !graph.contains(start) {
        return Ok(ends);
    }

    // reverse post-order is topological exactly when there is no cycle
    let mut dfs = DfsPostOrder::new(&graph.graph, start);
    let mut order = Vec::new();
    while let Some(state) = dfs.next(&graph.graph) {
        order.push(state);
    }
    order.reverse();

    let position: HashMap<S, usize> = order.iter()
        .enumerate()
        .map(|(index, state)| (*state, index))
        .collect();
    let mut paths: HashMap<S, usize> = HashMap::from([(start, 1)]);

    for (index, state) in order.iter().enumerate() {
        let count = paths.get(state).copied().unwrap_or(0);
        for edge in graph.outgoing(*state) {
            if position.get(&edge.to).is_some_and(|to| *to <= index) {
                return Err(CycleDetected(state.location()));
            }

            let entry = paths.entry(edge.to).or_insert(0);
            *entry = entry.saturating_add(count);
        }

        if is_end(state) {
            ends.insert(*state, count);
        }
    }

    trace!("{} end(s) reachable from {:?}", ends.len(), start);
    Ok(ends)
}
