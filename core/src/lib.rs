//! Waypoint Core - Step Graphs for Multi-Step Flows
//!
//! This crate defines the **structural** side of a stepper:
//! - [`StepGraph`] / [`Step`]: the tree of steps, chained by `next` and
//!   nested through `child_steps`
//! - [`Predicate`]: async `is_done` / `should_skip` conditions reading a [`Bus`]
//! - [`flatten`]: preorder flattening into a [`FlattenedSequence`]
//! - [`GraphManifest`]: TOML-declared graphs bound through a [`PredicateRegistry`]
//!
//! Resolution of the first step and navigation live in `waypoint-runtime`.

pub mod address;
pub mod bus;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod predicate;
pub mod sequence;
pub mod telemetry;

pub use address::{Address, DELIMITER};
pub use bus::Bus;
pub use error::{Result, WaypointError};
pub use graph::{Step, StepGraph, StepGraphBuilder};
pub use manifest::{GraphManifest, PredicateRegistry, StepManifest};
pub use predicate::{Predicate, SharedPredicate};
pub use sequence::{FlattenedSequence, NavRecord, flatten};
pub use telemetry::Traced;

pub mod prelude {
    pub use crate::address::Address;
    pub use crate::bus::Bus;
    pub use crate::error::{Result, WaypointError};
    pub use crate::graph::{Step, StepGraph};
    pub use crate::manifest::{GraphManifest, PredicateRegistry};
    pub use crate::predicate::{self, Predicate, SharedPredicate};
    pub use crate::sequence::{FlattenedSequence, NavRecord, flatten};
}
