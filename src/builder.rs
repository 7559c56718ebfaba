//! Builders turning grids into [`StateGraph`](crate::StateGraph)s.

use itertools::Itertools;
use log::debug;
use ndarray::{Array2, AssignElem};
use petgraph::graphmap::DiGraphMap;
use strum::VariantArray;

use crate::graph::{Cost, StateGraph};
use crate::grid::Grid;
use crate::heading::Heading;
use crate::location::{Dimension, Location};
use crate::state::{Oriented, State};

/// Cost of a single forward step unless configured otherwise.
pub const DEFAULT_STEP_COST: Cost = 1;
/// Cost of a 90 degree turn in place unless configured otherwise.
pub const DEFAULT_TURN_COST: Cost = 1000;

/// Decides whether a step from a cell labelled `from` to an adjacent open cell labelled `to` is allowed.
pub type StepRule = fn(from: char, to: char) -> bool;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuilderInvalidReason {
    /// A feature like a dropped location was placed outside the bounds specified by `dims` on a builder.
    #[error("feature placed outside the grid")]
    FeatureOutOfBounds,
}

/// Functionality all builders must implement, parametrised over the state type `S` of the resulting graph.
///
/// A builder owns the state model (which cells are open) and the edge generator (which transitions exist between states).
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
pub trait Builder<S: State>: Clone {
    /// Construct a new [`Self`] over an all-open grid with the specified dimensions, specified in `(x, y)` order.
    /// Every cell gets the label `.`.
    fn with_dims(dims: (Dimension, Dimension)) -> Self;
    /// Construct a new [`Self`] from a character grid. Cells for which `is_blocked` holds are walls and produce no states.
    fn from_grid(grid: &Grid, is_blocked: impl Fn(char) -> bool) -> Self;
    /// Block a location after construction, e.g. to insert an obstacle.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if `location` is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    fn drop_location(&mut self, location: Location) -> &mut Self;
    /// Shorthand for multiple calls to [`Self::drop_location`], with the same conditions.
    fn drop_locations(&mut self, locations: impl IntoIterator<Item=Location>) -> &mut Self {
        for location in locations {
            self.drop_location(location);
        }

        self
    }
    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>>;
    /// Generate every state and every outgoing edge.
    /// If the builder is invalid for any reason, a reference to a [`Vec`] of [`BuilderInvalidReason`] will indicate why.
    fn build(&self) -> Result<StateGraph<S>, &Vec<BuilderInvalidReason>>;
}

/// Open/blocked classification and labels shared by all grid builders.
#[derive(Clone, Debug)]
struct GridCells {
    // width, height
    dims: (Dimension, Dimension),
    labels: Array2<char>,
    open: Array2<bool>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl GridCells {
    fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            labels: Array2::from_elem((dims.1.get(), dims.0.get()), '.'),
            open: Array2::from_elem((dims.1.get(), dims.0.get()), true),
            invalid_reasons: Default::default(),
        }
    }

    fn from_grid(grid: &Grid, is_blocked: impl Fn(char) -> bool) -> Self {
        let mut cells = Self::with_dims(grid.dims());
        for (location, label) in grid.cells() {
            if let Some(index) = location.as_index() {
                cells.labels[index] = label;
                cells.open[index] = !is_blocked(label);
            }
        }

        cells
    }

    fn drop_location(&mut self, location: Location) {
        if !self.invalid_reasons.is_empty() {
            return;
        }

        match location.as_index().and_then(|index| self.open.get_mut(index)) {
            Some(cell) => cell.assign_elem(false),
            None => self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds),
        }
    }

    fn is_open(&self, location: Location) -> bool {
        location.as_index()
            .and_then(|index| self.open.get(index))
            .copied()
            .unwrap_or(false)
    }

    fn label(&self, location: Location) -> Option<char> {
        location.as_index().and_then(|index| self.labels.get(index)).copied()
    }

    // row-major
    fn open_locations(&self) -> Vec<Location> {
        self.open.indexed_iter()
            .filter(|(_, open)| **open)
            .map(|(index, _)| Location::from(index))
            .collect_vec()
    }

    fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }
}

/// A builder for position-only graphs: one state per open cell and one edge per open orthogonal neighbor.
#[derive(Clone, Debug)]
pub struct PlainGridBuilder {
    cells: GridCells,
    step_cost: Cost,
    step_rule: Option<StepRule>,
}

impl PlainGridBuilder {
    /// Set the cost of every step. Defaults to [`DEFAULT_STEP_COST`].
    pub fn step_cost(&mut self, cost: Cost) -> &mut Self {
        self.step_cost = cost;
        self
    }

    /// Only generate an edge when `rule` accepts the labels of both cells, e.g. to climb a height map one level at a time.
    pub fn step_rule(&mut self, rule: StepRule) -> &mut Self {
        self.step_rule = Some(rule);
        self
    }

    fn with_cells(cells: GridCells) -> Self {
        Self {
            cells,
            step_cost: DEFAULT_STEP_COST,
            step_rule: None,
        }
    }

    fn allows_step(&self, from: Location, to: Location) -> bool {
        if !self.cells.is_open(to) {
            return false;
        }

        match (self.step_rule, self.cells.label(from), self.cells.label(to)) {
            (None, _, _) => true,
            (Some(rule), Some(from_label), Some(to_label)) => rule(from_label, to_label),
            _ => false,
        }
    }
}

impl Builder<Location> for PlainGridBuilder {
    fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self::with_cells(GridCells::with_dims(dims))
    }

    fn from_grid(grid: &Grid, is_blocked: impl Fn(char) -> bool) -> Self {
        Self::with_cells(GridCells::from_grid(grid, is_blocked))
    }

    fn drop_location(&mut self, location: Location) -> &mut Self {
        self.cells.drop_location(location);
        self
    }

    fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        self.cells.is_valid()
    }

    fn build(&self) -> Result<StateGraph<Location>, &Vec<BuilderInvalidReason>> {
        if let Some(reasons) = self.cells.is_valid() {
            return Err(reasons);
        }

        let locations = self.cells.open_locations();
        // naively allocate for every cell having all four neighbors
        let mut graph = DiGraphMap::with_capacity(locations.len(), locations.len() * Heading::VARIANTS.len());
        for location in &locations {
            graph.add_node(*location);
        }

        for location in locations {
            for (_, neighbor) in Heading::neighbors_of(location) {
                if self.allows_step(location, neighbor) {
                    graph.add_edge(location, neighbor, self.step_cost);
                }
            }
        }

        debug!("built plain graph with {} states and {} edges", graph.node_count(), graph.edge_count());

        Ok(StateGraph { graph, dims: self.cells.dims })
    }
}

/// A builder for graphs whose states are a position plus a facing.
///
/// Each open cell yields exactly four states. From each state there are up to three transitions, generated in this order:
/// turn counter-clockwise, turn clockwise (both costing the turn cost and staying in place) and step forward.
#[derive(Clone, Debug)]
pub struct OrientedGridBuilder {
    cells: GridCells,
    step_cost: Cost,
    turn_cost: Cost,
}

impl OrientedGridBuilder {
    /// Set the cost of a forward step. Defaults to [`DEFAULT_STEP_COST`].
    pub fn step_cost(&mut self, cost: Cost) -> &mut Self {
        self.step_cost = cost;
        self
    }

    /// Set the cost of a 90 degree turn. Defaults to [`DEFAULT_TURN_COST`].
    pub fn turn_cost(&mut self, cost: Cost) -> &mut Self {
        self.turn_cost = cost;
        self
    }

    fn with_cells(cells: GridCells) -> Self {
        Self {
            cells,
            step_cost: DEFAULT_STEP_COST,
            turn_cost: DEFAULT_TURN_COST,
        }
    }
}

impl Builder<Oriented> for OrientedGridBuilder {
    fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self::with_cells(GridCells::with_dims(dims))
    }

    fn from_grid(grid: &Grid, is_blocked: impl Fn(char) -> bool) -> Self {
        Self::with_cells(GridCells::from_grid(grid, is_blocked))
    }

    fn drop_location(&mut self, location: Location) -> &mut Self {
        self.cells.drop_location(location);
        self
    }

    fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        self.cells.is_valid()
    }

    fn build(&self) -> Result<StateGraph<Oriented>, &Vec<BuilderInvalidReason>> {
        if let Some(reasons) = self.cells.is_valid() {
            return Err(reasons);
        }

        let locations = self.cells.open_locations();
        let state_count = locations.len() * Heading::VARIANTS.len();
        let mut graph = DiGraphMap::with_capacity(state_count, state_count * 3);
        for location in locations {
            for heading in Heading::VARIANTS {
                graph.add_node(Oriented::new(location, *heading));
            }
        }

        // collect to avoid mutating the graph while iterating its nodes
        for state in graph.nodes().collect_vec() {
            let transitions = [
                (state.turned_counter_clockwise(), self.turn_cost),
                (state.turned_clockwise(), self.turn_cost),
                (state.stepped_forward(), self.step_cost),
            ];

            for (next, cost) in transitions {
                if graph.contains_node(next) {
                    graph.add_edge(state, next, cost);
                }
            }
        }

        debug!("built oriented graph with {} states and {} edges", graph.node_count(), graph.edge_count());

        Ok(StateGraph { graph, dims: self.cells.dims })
    }
}
