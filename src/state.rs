use std::fmt::Debug;

use petgraph::graphmap::NodeTrait;

use crate::heading::Heading;
use crate::location::Location;

/// A node of a search graph.
///
/// States are small immutable values; the [`NodeTrait`] bound (`Copy + Ord + Hash`) makes equality and hashing structural,
/// which the solver relies on to key its optimum records.
pub trait State: NodeTrait + Debug {
    /// The grid cell this state occupies.
    fn location(&self) -> Location;
}

/// Position-only states.
impl State for Location {
    fn location(&self) -> Location {
        *self
    }
}

/// A grid position together with the direction being faced, for searches where turning costs something.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Oriented {
    /// The cell occupied.
    pub location: Location,
    /// The direction faced.
    pub heading: Heading,
}

impl Oriented {
    /// A state at `location` facing `heading`.
    pub fn new(location: Location, heading: Heading) -> Self {
        Self { location, heading }
    }

    pub(crate) fn turned_counter_clockwise(&self) -> Self {
        Self::new(self.location, self.heading.counter_clockwise())
    }

    pub(crate) fn turned_clockwise(&self) -> Self {
        Self::new(self.location, self.heading.clockwise())
    }

    pub(crate) fn stepped_forward(&self) -> Self {
        Self::new(self.heading.attempt_from(self.location), self.heading)
    }
}

impl State for Oriented {
    fn location(&self) -> Location {
        self.location
    }
}
