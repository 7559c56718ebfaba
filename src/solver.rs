use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace};

use crate::graph::{Cost, Edge, StateGraph, INFINITY};
use crate::state::State;

/// Reasons a [`PathSolver`] may fail.
///
/// An unreachable target is not a failure; it is reported as a cost of [`INFINITY`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SolverFailure {
    /// The start state is not a node of the graph, e.g. because it lies on a wall.
    #[error("start state is not part of the graph")]
    StartNotInGraph,
}

/// A sequence of edges leading away from the start state.
pub type Path<S> = Vec<Edge<S>>;

/// Finite costs of every reachable state, ordered by state.
pub type CostTable<S> = BTreeMap<S, Cost>;

/// The best known cost of a state together with every edge that reaches it at that cost.
///
/// Following predecessors back to the start enumerates every optimal path, see [`Optima::paths_to`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Optimum<S: State> {
    /// Cheapest known cost from the start, [`INFINITY`] if none.
    pub cost: Cost,
    /// Edges into this state achieving `cost`, in the order they were discovered.
    pub predecessors: Vec<Edge<S>>,
}

impl<S: State> Optimum<S> {
    fn unreached() -> Self {
        Self { cost: INFINITY, predecessors: Vec::new() }
    }

    /// Whether any path reaches this state.
    pub fn is_reachable(&self) -> bool {
        self.cost != INFINITY
    }
}

/// Single-source shortest paths over a [`StateGraph`], retaining every path that ties for the optimum.
/// Use [`Self::solve`] to run the search.
///
/// # Algorithm
/// This is Dijkstra's algorithm over a priority queue of `(cost, discovery sequence, state)`.
/// Entries of equal cost leave the queue in the order they entered it, so results do not depend on hashing.
///
/// Relaxing an edge `u -> v` with candidate cost `c = cost(u) + w`:
/// - if `c` beats the recorded cost of `v`, the record is replaced by `(c, [u -> v])` and `v` is enqueued;
/// - if `c` equals it, the path "forks": `u -> v` is appended to the predecessors of `v`, which is not re-enqueued;
/// - otherwise the edge is discarded.
///
/// Paths are never materialized during the search.
/// Each state keeps only its tying predecessor edges, so the memory used is bounded by the edge count
/// even when the number of optimal paths grows combinatorially.
pub struct PathSolver<'a, S: State> {
    graph: &'a StateGraph<S>,
    path_limit: Option<usize>,
}

impl<'a, S: State> From<&'a StateGraph<S>> for PathSolver<'a, S> {
    fn from(graph: &'a StateGraph<S>) -> Self {
        Self { graph, path_limit: None }
    }
}

/// Whether `ancestor` lies on some predecessor chain leading back from `state`, or is `state` itself.
fn is_ancestor<S: State>(records: &HashMap<S, Optimum<S>>, ancestor: S, state: S) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![state];
    while let Some(current) = stack.pop() {
        if current == ancestor {
            return true;
        }

        if seen.insert(current) {
            if let Some(optimum) = records.get(&current) {
                stack.extend(optimum.predecessors.iter().map(|edge| edge.from));
            }
        }
    }

    false
}

impl<S: State> PathSolver<'_, S> {
    /// Cap the number of paths [`Optima::paths_to`] materializes for any single state.
    pub fn path_limit(mut self, limit: usize) -> Self {
        self.path_limit = Some(limit);
        self
    }

    /// Compute the optimum record of every state from `start`.
    ///
    /// Returns [`Err`] only if `start` is not in the graph.
    pub fn solve(&self, start: S) -> Result<Optima<S>, SolverFailure> {
        if !self.graph.contains(start) {
            return Err(SolverFailure::StartNotInGraph);
        }

        let mut records: HashMap<S, Optimum<S>> = self.graph.states()
            .map(|state| (state, Optimum::unreached()))
            .collect();
        records.insert(start, Optimum { cost: 0, predecessors: Vec::new() });

        let mut settled = HashSet::with_capacity(records.len());
        let mut sequence: usize = 0;
        let mut unvisited: BinaryHeap<Reverse<(Cost, usize, S)>> = BinaryHeap::new();
        unvisited.push(Reverse((0, sequence, start)));

        while let Some(Reverse((cost_to_current, _, current))) = unvisited.pop() {
            // stale entry left behind by a later improvement
            if !settled.insert(current) {
                continue;
            }

            for edge in self.graph.outgoing(current) {
                let cost_through_current = cost_to_current.saturating_add(edge.cost);
                let Some(known) = records.get(&edge.to).map(|optimum| optimum.cost) else {
                    continue;
                };

                match cost_through_current.cmp(&known) {
                    Ordering::Less => {
                        if let Some(neighbor) = records.get_mut(&edge.to) {
                            neighbor.cost = cost_through_current;
                            neighbor.predecessors = vec![edge];
                        }
                        sequence += 1;
                        unvisited.push(Reverse((cost_through_current, sequence, edge.to)));
                    }
                    Ordering::Equal => {
                        // only a settled state can already be an ancestor; closing a zero-cost cycle would make paths infinite
                        if settled.contains(&edge.to) && is_ancestor(&records, edge.to, current) {
                            trace!("dropped zero-cost cycle {:?} -> {:?}", current, edge.to);
                            continue;
                        }

                        trace!("fork at {:?} with cost {}", edge.to, cost_through_current);
                        if let Some(neighbor) = records.get_mut(&edge.to) {
                            neighbor.predecessors.push(edge);
                        }
                    }
                    Ordering::Greater => {}
                }
            }
        }

        debug!("settled {} of {} states from {:?}", settled.len(), records.len(), start);

        Ok(Optima {
            start,
            records,
            path_limit: self.path_limit,
        })
    }
}

/// The result of [`PathSolver::solve`]: an [`Optimum`] for every state of the graph.
#[derive(Clone, Debug)]
pub struct Optima<S: State> {
    start: S,
    records: HashMap<S, Optimum<S>>,
    path_limit: Option<usize>,
}

impl<S: State> Optima<S> {
    /// The state the search began from.
    pub fn start(&self) -> S {
        self.start
    }

    /// The optimum record of `state`, or [`None`] if `state` is not in the graph.
    pub fn optimum(&self, state: S) -> Option<&Optimum<S>> {
        self.records.get(&state)
    }

    /// The minimal cost from the start to `state`; [`INFINITY`] if unreachable or unknown.
    pub fn cost(&self, state: S) -> Cost {
        self.records.get(&state).map_or(INFINITY, |optimum| optimum.cost)
    }

    /// Whether any path from the start reaches `state`.
    pub fn is_reachable(&self, state: S) -> bool {
        self.cost(state) != INFINITY
    }

    /// The smallest cost among states matching `predicate`, [`INFINITY`] if none is reachable.
    pub fn min_cost_where(&self, predicate: impl Fn(&S) -> bool) -> Cost {
        self.records.iter()
            .filter(|(state, _)| predicate(state))
            .map(|(_, optimum)| optimum.cost)
            .min()
            .unwrap_or(INFINITY)
    }

    /// Every reachable state with its cost.
    pub fn cost_table(&self) -> CostTable<S> {
        self.records.iter()
            .filter(|(_, optimum)| optimum.is_reachable())
            .map(|(state, optimum)| (*state, optimum.cost))
            .collect()
    }

    /// Every state with its optimum record, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item=(&S, &Optimum<S>)> {
        self.records.iter()
    }

    /// Every optimal path from the start to `target`, in predecessor discovery order.
    ///
    /// The start itself has exactly one path, the empty one; unreachable states have none.
    /// At most the configured [`path_limit`](PathSolver::path_limit) paths are returned.
    pub fn paths_to(&self, target: S) -> Vec<Path<S>> {
        let mut paths = Vec::new();
        if !self.is_reachable(target) || self.path_limit == Some(0) {
            return paths;
        }

        // edges are collected walking backwards from the target
        let mut stack: Vec<(S, Vec<Edge<S>>)> = vec![(target, Vec::new())];
        while let Some((state, suffix)) = stack.pop() {
            if state == self.start {
                paths.push(suffix.into_iter().rev().collect_vec());
                if self.path_limit.is_some_and(|limit| paths.len() >= limit) {
                    break;
                }
                continue;
            }

            let Some(optimum) = self.records.get(&state) else {
                continue;
            };
            // reversed so the first predecessor is expanded first
            for edge in optimum.predecessors.iter().rev() {
                let mut extended = suffix.clone();
                extended.push(*edge);
                stack.push((edge.from, extended));
            }
        }

        paths
    }

    /// Every state lying on at least one optimal path to any of `targets`, targets included.
    ///
    /// Walks the predecessor graph directly, so this stays cheap when [`Self::paths_to`] would not.
    pub fn states_on_optimal_paths(&self, targets: impl IntoIterator<Item=S>) -> HashSet<S> {
        let mut seen = HashSet::new();
        let mut stack = targets.into_iter()
            .filter(|target| self.is_reachable(*target))
            .collect_vec();

        while let Some(state) = stack.pop() {
            if !seen.insert(state) {
                continue;
            }

            if let Some(optimum) = self.records.get(&state) {
                stack.extend(optimum.predecessors.iter().map(|edge| edge.from));
            }
        }

        seen
    }
}
