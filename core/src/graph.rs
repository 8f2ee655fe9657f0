//! Step Graph - The Stepper Tree
//!
//! A [`StepGraph`] maps step names to [`Step`]s and names the step to start
//! from. Steps are chained through `next`; a step holding `child_steps` is a
//! *container* whose whole child graph is entered in its place.
//!
//! The graph is immutable input. It is read by the resolver and flattened
//! once into a [`FlattenedSequence`](crate::sequence::FlattenedSequence).
//!
//! # Example
//! ```rust
//! use waypoint_core::graph::{Step, StepGraph};
//!
//! let graph = StepGraph::builder("1")
//!     .step(Step::new("1").next("2"))
//!     .step(Step::new("2").can_go_back(false).next("3"))
//!     .step(Step::new("3"))
//!     .build();
//!
//! assert_eq!(graph.initial_step(), "1");
//! ```
//!
//! The `next` chain and `child_steps` nesting must be acyclic; traversal does
//! not detect cycles.

use crate::address::Address;
use crate::bus::Bus;
use crate::error::{Result, WaypointError};
use crate::predicate::{self, SharedPredicate};
use ahash::AHashMap;
use std::fmt;

/// A single node of the stepper.
#[derive(Clone)]
pub struct Step {
    name: String,
    next: Option<String>,
    is_done: Option<SharedPredicate>,
    should_skip: Option<SharedPredicate>,
    can_go_back: Option<bool>,
    child_steps: Option<StepGraph>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Step {
            name: name.into(),
            next: None,
            is_done: None,
            should_skip: None,
            can_go_back: None,
            child_steps: None,
        }
    }

    /// Name of the following sibling in the same graph.
    pub fn next(mut self, name: impl Into<String>) -> Self {
        self.next = Some(name.into());
        self
    }

    pub fn is_done_when(mut self, predicate: SharedPredicate) -> Self {
        self.is_done = Some(predicate);
        self
    }

    pub fn skip_when(mut self, predicate: SharedPredicate) -> Self {
        self.should_skip = Some(predicate);
        self
    }

    /// Override the positional back-navigation default.
    pub fn can_go_back(mut self, allowed: bool) -> Self {
        self.can_go_back = Some(allowed);
        self
    }

    /// Turn this step into a container for `graph`.
    pub fn child_steps(mut self, graph: StepGraph) -> Self {
        self.child_steps = Some(graph);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn next_step(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn children(&self) -> Option<&StepGraph> {
        self.child_steps.as_ref()
    }

    pub fn is_container(&self) -> bool {
        self.child_steps.is_some()
    }

    /// Explicit back-navigation flag, `None` when the positional default
    /// applies.
    pub fn can_go_back_override(&self) -> Option<bool> {
        self.can_go_back
    }

    pub fn is_done_predicate(&self) -> Option<&SharedPredicate> {
        self.is_done.as_ref()
    }

    pub fn should_skip_predicate(&self) -> Option<&SharedPredicate> {
        self.should_skip.as_ref()
    }

    /// `false` when no `is_done` predicate is set.
    pub async fn is_done(&self, bus: &Bus) -> anyhow::Result<bool> {
        predicate::evaluate_or_false(self.is_done.as_ref(), bus).await
    }

    /// `false` when no `should_skip` predicate is set.
    pub async fn should_skip(&self, bus: &Bus) -> anyhow::Result<bool> {
        predicate::evaluate_or_false(self.should_skip.as_ref(), bus).await
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("next", &self.next)
            .field("is_done", &self.is_done.is_some())
            .field("should_skip", &self.should_skip.is_some())
            .field("can_go_back", &self.can_go_back)
            .field("child_steps", &self.child_steps)
            .finish()
    }
}

/// A mapping from step name to step plus the name to start from.
#[derive(Clone)]
pub struct StepGraph {
    initial_step: String,
    steps: AHashMap<String, Step>,
}

impl StepGraph {
    pub fn builder(initial_step: impl Into<String>) -> StepGraphBuilder {
        StepGraphBuilder {
            initial_step: initial_step.into(),
            steps: AHashMap::new(),
        }
    }

    pub fn initial_step(&self) -> &str {
        &self.initial_step
    }

    pub fn get(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }

    /// Look a step up, failing with [`WaypointError::MissingStep`].
    ///
    /// `scope` is the address of the container owning this graph and only
    /// feeds the error message.
    pub fn lookup(&self, name: &str, scope: Option<&Address>) -> Result<&Step> {
        self.steps
            .get(name)
            .ok_or_else(|| WaypointError::missing_step(name, scope))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in arbitrary order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }
}

impl fmt::Debug for StepGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.steps.keys().collect();
        names.sort();
        f.debug_struct("StepGraph")
            .field("initial_step", &self.initial_step)
            .field("steps", &names)
            .finish()
    }
}

pub struct StepGraphBuilder {
    initial_step: String,
    steps: AHashMap<String, Step>,
}

impl StepGraphBuilder {
    /// Add a step, replacing any step already registered under its name.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.insert(step.name.clone(), step);
        self
    }

    pub fn steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        steps.into_iter().fold(self, StepGraphBuilder::step)
    }

    pub fn build(self) -> StepGraph {
        StepGraph {
            initial_step: self.initial_step,
            steps: self.steps,
        }
    }
}
