//! Answers derived from a solved cost table: shortcuts and tiles on optimal paths.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::graph::{Cost, INFINITY};
use crate::location::{manhattan, Location};
use crate::solver::{CostTable, Optima};
use crate::state::State;

/// A jump from `from` to `to` that skips the track between them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Cheat {
    /// Where the jump starts.
    pub from: Location,
    /// Where the jump lands.
    pub to: Location,
    /// Track cost avoided, after paying for the jump itself.
    pub savings: Cost,
}

/// Savings of jumping directly from `from` to `to` given their costs from the start, or [`None`] if the jump does not pay off.
///
/// The jump costs the Manhattan distance between the two locations.
pub fn savings(from: (Location, Cost), to: (Location, Cost)) -> Option<Cost> {
    let distance = manhattan(from.0, to.0) as Cost;
    to.1.checked_sub(from.1)?.checked_sub(distance)
}

/// Every jump of Manhattan length `1..=max_jump` between two reachable locations that saves at least `required_savings`.
///
/// Jumps are reported ordered by `(from, to)`.
pub fn find_cheats(costs: &CostTable<Location>, max_jump: usize, required_savings: Cost) -> Vec<Cheat> {
    costs.iter()
        .cartesian_product(costs.iter())
        .filter(|((from, _), (to, _))| (1..=max_jump).contains(&manhattan(**from, **to)))
        .filter_map(|((from, from_cost), (to, to_cost))| {
            savings((*from, *from_cost), (*to, *to_cost)).map(|savings| Cheat { from: *from, to: *to, savings })
        })
        .filter(|cheat| cheat.savings >= required_savings)
        .collect_vec()
}

/// How many cheats there are for each amount saved.
pub fn savings_histogram(cheats: &[Cheat]) -> BTreeMap<Cost, usize> {
    cheats.iter()
        .map(|cheat| cheat.savings)
        .counts()
        .into_iter()
        .collect()
}

/// Distinct locations on any optimal path to the cheapest target states.
///
/// Targets are the states matching `is_target`; only those reached at the minimal target cost contribute.
/// Empty if no target is reachable.
pub fn tiles_on_best_paths<S: State>(optima: &Optima<S>, is_target: impl Fn(&S) -> bool) -> BTreeSet<Location> {
    let best = optima.min_cost_where(&is_target);
    if best == INFINITY {
        return BTreeSet::new();
    }

    let targets = optima.iter()
        .filter(|(state, optimum)| is_target(state) && optimum.cost == best)
        .map(|(state, _)| *state)
        .collect_vec();

    optima.states_on_optimal_paths(targets)
        .into_iter()
        .map(|state| state.location())
        .collect()
}
