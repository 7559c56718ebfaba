use petgraph::dot::Dot;
use petgraph::graphmap::DiGraphMap;

use crate::location::Dimension;
use crate::state::State;

/// Edge weights. Non-negative by construction.
pub type Cost = u64;

/// The cost recorded for states no path reaches.
pub const INFINITY: Cost = Cost::MAX;

/// One legal transition between two states.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Edge<S: State> {
    /// State the edge leaves.
    pub from: S,
    /// State the edge enters.
    pub to: S,
    /// Price of taking the edge.
    pub cost: Cost,
}

impl<S: State> From<(S, S, &Cost)> for Edge<S> {
    fn from(value: (S, S, &Cost)) -> Self {
        let (from, to, cost) = value;
        Self { from, to, cost: *cost }
    }
}

/// A directed, weighted search graph derived from a grid.
///
/// [`StateGraph`]s should be built using a [`Builder`](crate::builder::Builder) such as
/// [`PlainGridBuilder`](crate::builder::PlainGridBuilder) or [`OrientedGridBuilder`](crate::builder::OrientedGridBuilder).
/// Outgoing edges of a state are kept in the order the builder generated them.
#[derive(Clone, Debug)]
pub struct StateGraph<S: State> {
    pub(crate) graph: DiGraphMap<S, Cost>,
    pub(crate) dims: (Dimension, Dimension),
}

impl<S: State> StateGraph<S> {
    /// Dimensions of the grid this graph was built from, in `(x, y)` order.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Every state, in insertion (row-major) order.
    pub fn states(&self) -> impl Iterator<Item=S> + '_ {
        self.graph.nodes()
    }

    /// Whether `state` is a node of this graph.
    pub fn contains(&self, state: S) -> bool {
        self.graph.contains_node(state)
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of `state` in generation order. Empty if `state` is not in the graph.
    pub fn outgoing(&self, state: S) -> impl Iterator<Item=Edge<S>> + '_ {
        self.graph.edges(state).map(Edge::from)
    }

    /// Every edge, grouped by source state.
    pub fn edges(&self) -> impl Iterator<Item=Edge<S>> + '_ {
        self.graph.all_edges().map(Edge::from)
    }

    /// Dump the graph in Graphviz DOT, for inspection with external tools.
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[]))
    }
}
