//! A guard walking a grid, and the obstacles that trap them in a loop.

use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;
use log::debug;

use crate::grid::{Grid, GridError};
use crate::heading::Heading;
use crate::location::Location;
use crate::state::Oriented;

/// Characters a guard cannot walk through.
pub const OBSTACLES: [char; 2] = ['#', 'O'];

/// What happened at one step of a patrol.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    /// The guard's initial state.
    Start,
    /// A step into the cell ahead.
    Forward,
    /// A clockwise turn in place.
    Turn,
    /// The state was already visited; the patrol loops forever from here.
    Cycle,
    /// The guard stepped off the grid.
    Outside,
}

/// The full record of a patrol, ending in either [`Action::Cycle`] or [`Action::Outside`].
#[derive(Clone, Debug)]
pub struct Patrol {
    /// Every state in order, with how it was reached.
    pub steps: Vec<(Oriented, Action)>,
}

impl Patrol {
    /// Whether the patrol ended by revisiting a state.
    pub fn is_loop(&self) -> bool {
        self.steps.last().is_some_and(|(_, action)| *action == Action::Cycle)
    }

    /// Distinct grid cells the guard stood on.
    pub fn visited_locations(&self) -> BTreeSet<Location> {
        self.steps.iter()
            .filter(|(_, action)| matches!(action, Action::Start | Action::Forward))
            .map(|(state, _)| state.location)
            .collect()
    }
}

/// Locate the guard, marked by one of `^`, `>`, `v` or `<`.
pub fn find_guard(grid: &Grid) -> Result<Oriented, GridError> {
    grid.cells()
        .find_map(|(location, c)| Heading::from_marker(c).map(|heading| Oriented::new(location, heading)))
        .ok_or(GridError::MarkerNotFound('^'))
}

fn is_obstructed(grid: &Grid, location: Location) -> bool {
    grid.get(location).is_some_and(|c| OBSTACLES.contains(&c))
}

/// Walk forward from `start` until an obstacle is ahead, then turn clockwise; repeat until the guard leaves the grid or repeats a state.
pub fn patrol(grid: &Grid, start: Oriented) -> Patrol {
    let mut current = start;
    let mut visited = HashSet::from([current]);
    let mut steps = vec![(current, Action::Start)];

    loop {
        let ahead = current.stepped_forward();
        if !grid.contains(ahead.location) {
            steps.push((ahead, Action::Outside));
            break;
        }

        let (next, action) = if is_obstructed(grid, ahead.location) {
            (current.turned_clockwise(), Action::Turn)
        } else {
            (ahead, Action::Forward)
        };

        if !visited.insert(next) {
            steps.push((next, Action::Cycle));
            break;
        }

        steps.push((next, action));
        current = next;
    }

    Patrol { steps }
}

/// Every cell where a single extra obstacle traps the guard in a loop.
///
/// Only cells on the unobstructed route can change the patrol, so only those are tried; the guard's own cell is excluded.
/// Results are in row-major order.
pub fn loop_inducing_obstructions(grid: &Grid, start: Oriented) -> Vec<Location> {
    let candidates = patrol(grid, start).visited_locations()
        .into_iter()
        .filter(|location| *location != start.location && !is_obstructed(grid, *location))
        .sorted_by_key(|location| (location.1, location.0))
        .collect_vec();

    let found = candidates.into_iter()
        .filter(|location| {
            let mut obstructed = grid.clone();
            obstructed.set(*location, 'O');
            patrol(&obstructed, start).is_loop()
        })
        .collect_vec();

    debug!("{} obstruction(s) trap the guard starting at {}", found.len(), start.location);
    found
}
