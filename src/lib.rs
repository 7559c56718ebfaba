#![warn(missing_docs)]

//! # `wayfinder`
//!
//! Search machinery for puzzles played on rectangular character grids: mazes with turning costs, race tracks with shortcuts,
//! gardens split into plots, corrupted memory spaces and patrolling guards.
//! Begin by parsing a [`Grid`], hand it to a builder such as [`PlainGridBuilder`](builder::PlainGridBuilder) or
//! [`OrientedGridBuilder`](builder::OrientedGridBuilder) in the [`builder`] module, then [`build`](builder::Builder::build) a [`StateGraph`].
//! Feed that to a [`PathSolver`] to get the [`Optima`] of every state.
//!
//! `wayfinder` is generic over the search state, as encoded by the [`State`] trait.
//! Plain grid positions ([`Location`]) and positions with a facing ([`Oriented`]) are built in.
//!
//! # Internals
//! The solver is Dijkstra's algorithm with one twist: when a second path reaches a state at exactly its best cost,
//! the path "forks" and both are kept.
//! Rather than copying whole paths at every fork, each state remembers only the edges that reached it at its best cost.
//! Those edges form an acyclic predecessor graph from which every optimal path can be recovered on demand,
//! and from which the set of states on any optimal path can be read without enumerating paths at all.
//!
//! Everything else (regions, shortcut counting, blockade searches) consumes either the grid directly or the cost table the solver produces.

pub use graph::{Cost, Edge, StateGraph, INFINITY};
pub use grid::{Grid, GridError};
pub use heading::Heading;
pub use location::{add, manhattan, scale, subtract, Dimension, Location};
pub use solver::{CostTable, Optima, Optimum, Path, PathSolver, SolverFailure};
pub use state::{Oriented, State};

pub mod blockade;
pub mod builder;
pub(crate) mod graph;
pub(crate) mod grid;
pub(crate) mod heading;
pub mod keypad;
pub(crate) mod location;
pub mod metrics;
pub mod patrol;
pub mod region;
pub mod render;
pub(crate) mod solver;
pub(crate) mod state;
mod tests;
