//! Graph Manifest - Declarative Step Graphs
//!
//! A step graph can be declared in TOML and bound to code at load time.
//! Predicates are referenced by name and looked up in a
//! [`PredicateRegistry`]:
//!
//! ```toml
//! initial_step = "welcome"
//!
//! [steps.welcome]
//! next = "profile"
//!
//! [steps.profile]
//! is_done = "profile_complete"
//! next = "billing"
//!
//! [steps.billing]
//! can_go_back = false
//!
//! [steps.billing.child_steps]
//! initial_step = "plan"
//!
//! [steps.billing.child_steps.steps.plan]
//! should_skip = "on_free_tier"
//! ```
//!
//! Only parsing and predicate-name resolution are checked here; dangling
//! `next` references surface when the graph is traversed.

use crate::error::{Result, WaypointError};
use crate::graph::{Step, StepGraph};
use crate::predicate::SharedPredicate;
use crate::telemetry::Traced;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphManifest {
    pub initial_step: String,
    #[serde(default)]
    pub steps: BTreeMap<String, StepManifest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_skip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_go_back: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_steps: Option<GraphManifest>,
}

impl GraphManifest {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Bind predicate names and produce the runtime graph.
    pub fn build(&self, registry: &PredicateRegistry) -> Result<StepGraph> {
        let mut builder = StepGraph::builder(self.initial_step.clone());

        for (name, manifest) in &self.steps {
            let mut step = Step::new(name.clone());
            if let Some(next) = &manifest.next {
                step = step.next(next.clone());
            }
            if let Some(predicate) = &manifest.is_done {
                step = step.is_done_when(registry.resolve(predicate)?);
            }
            if let Some(predicate) = &manifest.should_skip {
                step = step.skip_when(registry.resolve(predicate)?);
            }
            if let Some(allowed) = manifest.can_go_back {
                step = step.can_go_back(allowed);
            }
            if let Some(children) = &manifest.child_steps {
                step = step.child_steps(children.build(registry)?);
            }
            builder = builder.step(step);
        }

        Ok(builder.build())
    }
}

/// Named predicates a manifest may refer to.
#[derive(Default, Clone)]
pub struct PredicateRegistry {
    predicates: AHashMap<String, SharedPredicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `predicate` under `name`. Evaluations are traced under that
    /// name.
    pub fn register(&mut self, name: impl Into<String>, predicate: SharedPredicate) -> &mut Self {
        let name = name.into();
        let traced: SharedPredicate = Arc::new(Traced::new(predicate, &name));
        self.predicates.insert(name, traced);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SharedPredicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    fn resolve(&self, name: &str) -> Result<SharedPredicate> {
        self.get(name)
            .cloned()
            .ok_or_else(|| WaypointError::UnknownPredicate(name.to_string()))
    }
}

impl std::fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.predicates.keys().collect();
        names.sort();
        f.debug_struct("PredicateRegistry")
            .field("predicates", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::predicate::constant;
    use crate::sequence::flatten;

    const ONBOARDING: &str = r#"
        initial_step = "1"

        [steps.1]
        next = "2"

        [steps.2]
        should_skip = "never"
        next = "3"

        [steps.2.child_steps]
        initial_step = "2.1"

        [steps.2.child_steps.steps."2.1"]
        is_done = "always"
        next = "2.2"

        [steps.2.child_steps.steps."2.2"]
        can_go_back = false

        [steps.3]
    "#;

    fn registry() -> PredicateRegistry {
        let mut registry = PredicateRegistry::new();
        registry
            .register("always", constant(true))
            .register("never", constant(false));
        registry
    }

    #[test]
    fn test_parse_nested_manifest() {
        let manifest = GraphManifest::from_toml_str(ONBOARDING).unwrap();
        assert_eq!(manifest.initial_step, "1");
        assert_eq!(manifest.steps.len(), 3);

        let children = manifest.steps["2"].child_steps.as_ref().unwrap();
        assert_eq!(children.initial_step, "2.1");
        assert_eq!(children.steps["2.2"].can_go_back, Some(false));
    }

    #[tokio::test]
    async fn test_build_binds_predicates() {
        let graph = GraphManifest::from_toml_str(ONBOARDING)
            .unwrap()
            .build(&registry())
            .unwrap();

        let bus = Bus::new();
        let container = graph.get("2").unwrap();
        assert!(!container.should_skip(&bus).await.unwrap());

        let first_child = container.children().unwrap().get("2.1").unwrap();
        assert!(first_child.is_done(&bus).await.unwrap());

        let addresses: Vec<String> = flatten(&graph)
            .unwrap()
            .addresses()
            .map(ToString::to_string)
            .collect();
        assert_eq!(addresses, vec!["1", "2/2.1", "2/2.2", "3"]);
    }

    #[test]
    fn test_unknown_predicate_is_rejected() {
        let manifest = GraphManifest::from_toml_str(ONBOARDING).unwrap();
        let err = manifest.build(&PredicateRegistry::new()).unwrap_err();
        assert!(matches!(err, WaypointError::UnknownPredicate(_)));
    }

    #[test]
    fn test_unknown_field_is_a_manifest_error() {
        let err = GraphManifest::from_toml_str("initial_step = \"1\"\n[steps.1]\nnxt = \"2\"\n")
            .unwrap_err();
        assert!(matches!(err, WaypointError::Manifest(_)));
    }
}
