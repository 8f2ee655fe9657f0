//! Flattened Sequence - The Linear Navigation Space
//!
//! [`flatten`] walks a [`StepGraph`] in preorder, treating `child_steps` as
//! the left child and `next` as the right sibling, and emits one
//! [`NavRecord`] per leaf step. Containers never appear in the output; their
//! child graph is spliced in at their position.
//!
//! Flattening is synchronous and pure. `should_skip` predicates are carried
//! into the records unevaluated so navigation can ask them again on every
//! move.

use crate::address::Address;
use crate::bus::Bus;
use crate::error::Result;
use crate::graph::StepGraph;
use crate::predicate::{self, SharedPredicate};
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

/// Navigation metadata for one leaf step.
#[derive(Clone, Serialize)]
pub struct NavRecord {
    pub address: Address,
    pub can_go_back: bool,
    #[serde(skip)]
    should_skip: Option<SharedPredicate>,
}

impl NavRecord {
    pub fn new(address: Address, can_go_back: bool) -> Self {
        NavRecord {
            address,
            can_go_back,
            should_skip: None,
        }
    }

    pub fn with_skip(mut self, predicate: SharedPredicate) -> Self {
        self.should_skip = Some(predicate);
        self
    }

    pub fn has_skip_predicate(&self) -> bool {
        self.should_skip.is_some()
    }

    /// `false` when the step carries no `should_skip` predicate.
    pub async fn should_skip(&self, bus: &Bus) -> anyhow::Result<bool> {
        predicate::evaluate_or_false(self.should_skip.as_ref(), bus).await
    }
}

impl fmt::Debug for NavRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavRecord")
            .field("address", &self.address)
            .field("can_go_back", &self.can_go_back)
            .field("should_skip", &self.should_skip.is_some())
            .finish()
    }
}

impl PartialEq for NavRecord {
    /// Records compare by address and flag; predicates compare by identity.
    fn eq(&self, other: &Self) -> bool {
        let same_skip = match (&self.should_skip, &other.should_skip) {
            (Some(a), Some(b)) => std::sync::Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.address == other.address && self.can_go_back == other.can_go_back && same_skip
    }
}

/// Ordered leaf records plus an address index.
///
/// Order is fixed at construction; navigation only reads it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlattenedSequence {
    records: Vec<NavRecord>,
    #[serde(skip)]
    index: AHashMap<Address, usize>,
}

impl FlattenedSequence {
    /// Build a sequence from already ordered records.
    ///
    /// If two records share an address the first one wins the index slot.
    pub fn from_records(records: Vec<NavRecord>) -> Self {
        let mut index = AHashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.address.clone()).or_insert(position);
        }
        FlattenedSequence { records, index }
    }

    pub fn records(&self) -> &[NavRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&NavRecord> {
        self.records.get(position)
    }

    pub fn position(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    pub fn record(&self, address: &Address) -> Option<&NavRecord> {
        self.position(address).and_then(|position| self.records.get(position))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn first(&self) -> Option<&NavRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&NavRecord> {
        self.records.last()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.records.iter().map(|record| &record.address)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.records).unwrap_or(serde_json::Value::Null)
    }
}

/// Flatten `graph` into its navigation sequence.
///
/// Fails with `MissingStep` when `initial_step` or a `next` reference does
/// not resolve inside its graph.
pub fn flatten(graph: &StepGraph) -> Result<FlattenedSequence> {
    let mut records = Vec::new();
    visit(graph, None, &mut records)?;
    tracing::debug!(records = records.len(), "Flattened step graph");
    Ok(FlattenedSequence::from_records(records))
}

/// Preorder over one graph. Siblings are walked iteratively; recursion depth
/// follows `child_steps` nesting only.
fn visit(graph: &StepGraph, scope: Option<&Address>, out: &mut Vec<NavRecord>) -> Result<()> {
    let mut cursor = Some(graph.initial_step());

    while let Some(name) = cursor {
        let step = graph.lookup(name, scope)?;
        let address = Address::within(scope, step.name());

        match step.children() {
            Some(children) => visit(children, Some(&address), out)?,
            None => {
                // Positional default: only the very first emitted record blocks back-navigation.
                let can_go_back = step.can_go_back_override().unwrap_or(!out.is_empty());
                out.push(NavRecord {
                    address,
                    can_go_back,
                    should_skip: step.should_skip_predicate().cloned(),
                });
            }
        }

        cursor = step.next_step();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaypointError;
    use crate::graph::Step;
    use crate::predicate::constant;

    fn summary(sequence: &FlattenedSequence) -> Vec<(String, bool)> {
        sequence
            .records()
            .iter()
            .map(|r| (r.address.to_string(), r.can_go_back))
            .collect()
    }

    fn three_steps() -> StepGraph {
        StepGraph::builder("1")
            .step(Step::new("1").next("2"))
            .step(Step::new("2").can_go_back(false).next("3"))
            .step(Step::new("3"))
            .build()
    }

    #[test]
    fn test_flatten_linear_graph() {
        let sequence = flatten(&three_steps()).unwrap();
        assert_eq!(
            summary(&sequence),
            vec![
                ("1".to_string(), false),
                ("2".to_string(), false),
                ("3".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_flatten_nested_preorder() {
        let inner = StepGraph::builder("2.1.1")
            .step(Step::new("2.1.1").next("2.1.2"))
            .step(Step::new("2.1.2"))
            .build();
        let middle = StepGraph::builder("2.1")
            .step(Step::new("2.1").child_steps(inner).next("2.2"))
            .step(Step::new("2.2"))
            .build();
        let graph = StepGraph::builder("1")
            .step(Step::new("1").next("2"))
            .step(Step::new("2").child_steps(middle).next("3"))
            .step(Step::new("3"))
            .build();

        let sequence = flatten(&graph).unwrap();
        let addresses: Vec<&str> = sequence.addresses().map(Address::as_str).collect();
        assert_eq!(addresses, vec!["1", "2/2.1/2.1.1", "2/2.1/2.1.2", "2/2.2", "3"]);
        assert_eq!(sequence.position(&Address::from("2/2.2")), Some(3));
        assert!(!sequence.contains(&Address::from("2")));
    }

    #[test]
    fn test_first_record_default_is_positional() {
        let children = StepGraph::builder("a")
            .step(Step::new("a").next("b"))
            .step(Step::new("b"))
            .build();
        let graph = StepGraph::builder("root")
            .step(Step::new("root").child_steps(children))
            .build();

        let sequence = flatten(&graph).unwrap();
        assert_eq!(
            summary(&sequence),
            vec![("root/a".to_string(), false), ("root/b".to_string(), true)]
        );
    }

    #[test]
    fn test_explicit_can_go_back_on_first_record() {
        let graph = StepGraph::builder("1")
            .step(Step::new("1").can_go_back(true).next("2"))
            .step(Step::new("2"))
            .build();

        let sequence = flatten(&graph).unwrap();
        assert!(sequence.first().unwrap().can_go_back);
        assert!(sequence.last().unwrap().can_go_back);
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let graph = three_steps();
        assert_eq!(flatten(&graph).unwrap().records(), flatten(&graph).unwrap().records());
    }

    #[test]
    fn test_skip_predicate_is_carried_not_evaluated() {
        let skip = constant(true);
        let graph = StepGraph::builder("1")
            .step(Step::new("1").next("2"))
            .step(Step::new("2").skip_when(skip.clone()))
            .build();

        let sequence = flatten(&graph).unwrap();
        assert_eq!(sequence.len(), 2);
        assert!(!sequence.get(0).unwrap().has_skip_predicate());
        assert_eq!(
            sequence.get(1).unwrap(),
            &NavRecord::new(Address::from("2"), true).with_skip(skip)
        );
    }

    #[test]
    fn test_missing_next_is_lookup_failure() {
        let graph = StepGraph::builder("1")
            .step(Step::new("1").next("ghost"))
            .build();

        match flatten(&graph) {
            Err(WaypointError::MissingStep { name, scope }) => {
                assert_eq!(name, "ghost");
                assert!(scope.is_none());
            }
            other => panic!("expected MissingStep, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_child_initial_step_reports_scope() {
        let children = StepGraph::builder("nope").step(Step::new("2.1")).build();
        let graph = StepGraph::builder("2")
            .step(Step::new("2").child_steps(children))
            .build();

        match flatten(&graph) {
            Err(WaypointError::MissingStep { name, scope }) => {
                assert_eq!(name, "nope");
                assert_eq!(scope, Some(Address::root("2")));
            }
            other => panic!("expected MissingStep, got {other:?}"),
        }
    }

    #[test]
    fn test_to_json_omits_predicates() {
        let sequence = flatten(&three_steps()).unwrap();
        assert_eq!(
            sequence.to_json(),
            serde_json::json!([
                { "address": "1", "can_go_back": false },
                { "address": "2", "can_go_back": false },
                { "address": "3", "can_go_back": true },
            ])
        );
    }
}
