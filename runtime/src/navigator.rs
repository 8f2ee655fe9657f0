//! # Navigator: Moving Through the Flattened Sequence
//!
//! The `Navigator` owns one flow instance: the flattened sequence of its
//! graph and the address the user is currently on. `next` and `previous`
//! move one record at a time and keep moving in the same direction while
//! the landing record's `should_skip` answers `true`.
//!
//! * Stopping at a boundary, on an unknown address, or on a record that
//!   forbids going back is a no-op reported as a [`Movement`], never an error.
//! * Predicate failures propagate and leave the current address unchanged.
//! * Calls take `&mut self`, so overlapping moves on one navigator cannot
//!   race. Callers sharing a navigator across tasks must serialize access.
//!
//! Watchers obtained from [`Navigator::subscribe`] are notified whenever the
//! current address changes.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::Instrument;
use waypoint_core::{Address, Bus, FlattenedSequence, NavRecord, Result, StepGraph, flatten};

use crate::resolver::resolve_first_step;

/// Result of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Movement {
    /// The current address changed.
    Moved { from: Address, to: Address },
    /// No non-skipped record remains in that direction.
    AtBoundary,
    /// A record being left behind has `can_go_back == false`.
    BackBlocked,
    /// The current address is not part of the sequence.
    NotInSequence,
}

impl Movement {
    pub fn is_moved(&self) -> bool {
        matches!(self, Movement::Moved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

pub struct Navigator {
    sequence: Arc<FlattenedSequence>,
    current: Address,
    notifier: watch::Sender<Address>,
}

impl Navigator {
    /// Create a navigator positioned on `current`.
    ///
    /// `current` is not checked against the sequence; moving from an
    /// unknown address is a `NotInSequence` no-op.
    pub fn new(sequence: impl Into<Arc<FlattenedSequence>>, current: Address) -> Self {
        let (notifier, _) = watch::channel(current.clone());
        Navigator {
            sequence: sequence.into(),
            current,
            notifier,
        }
    }

    /// Resolve the starting address and flatten `graph` for one flow.
    pub async fn start(graph: &StepGraph, bus: &Bus) -> Result<Self> {
        let sequence = flatten(graph)?;
        let current = resolve_first_step(graph, bus).await?;
        Ok(Navigator::new(sequence, current))
    }

    pub fn current(&self) -> &Address {
        &self.current
    }

    /// Record of the current address, `None` if it is not in the sequence.
    pub fn current_record(&self) -> Option<&NavRecord> {
        self.sequence.record(&self.current)
    }

    /// Whether `previous` is allowed to leave the current record.
    pub fn can_go_back(&self) -> bool {
        self.current_record().is_some_and(|record| record.can_go_back)
    }

    pub fn sequence(&self) -> &Arc<FlattenedSequence> {
        &self.sequence
    }

    /// Watch the current address. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Address> {
        self.notifier.subscribe()
    }

    pub async fn next(&mut self, bus: &Bus) -> Result<Movement> {
        self.step(Direction::Forward, bus).await
    }

    pub async fn previous(&mut self, bus: &Bus) -> Result<Movement> {
        self.step(Direction::Backward, bus).await
    }

    async fn step(&mut self, direction: Direction, bus: &Bus) -> Result<Movement> {
        let span = tracing::info_span!(
            "Navigate",
            waypoint.direction = ?direction,
            waypoint.from = %self.current
        );

        let target = find_target(&self.sequence, &self.current, direction, bus)
            .instrument(span.clone())
            .await?;

        let movement = match target {
            Ok(position) => {
                let to = self.sequence.records()[position].address.clone();
                let from = std::mem::replace(&mut self.current, to.clone());
                self.notifier.send_replace(to.clone());
                tracing::info!(parent: &span, %from, %to, "Moved");
                Movement::Moved { from, to }
            }
            Err(stay) => {
                tracing::debug!(parent: &span, reason = ?stay, "Stayed");
                stay
            }
        };
        Ok(movement)
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("current", &self.current)
            .field("records", &self.sequence.len())
            .finish()
    }
}

/// Walk from `current` in `direction` until a record that is not skipped.
///
/// Each skipped record becomes the new origin, so going backwards checks its
/// `can_go_back` before passing it. Predicates are evaluated strictly in
/// walk order.
async fn find_target(
    sequence: &FlattenedSequence,
    current: &Address,
    direction: Direction,
    bus: &Bus,
) -> Result<std::result::Result<usize, Movement>> {
    let Some(mut origin) = sequence.position(current) else {
        return Ok(Err(Movement::NotInSequence));
    };

    loop {
        let candidate = match direction {
            Direction::Forward => {
                if origin + 1 >= sequence.len() {
                    return Ok(Err(Movement::AtBoundary));
                }
                origin + 1
            }
            Direction::Backward => {
                if origin == 0 {
                    return Ok(Err(Movement::AtBoundary));
                }
                if !sequence.records()[origin].can_go_back {
                    return Ok(Err(Movement::BackBlocked));
                }
                origin - 1
            }
        };

        let record = &sequence.records()[candidate];
        if record.should_skip(bus).await? {
            tracing::debug!(step = %record.address, "Skipping step");
            origin = candidate;
            continue;
        }
        return Ok(Ok(candidate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::Step;
    use waypoint_core::predicate::constant;

    fn three_steps(second: Step) -> StepGraph {
        StepGraph::builder("1")
            .step(Step::new("1").next("2"))
            .step(second.next("3"))
            .step(Step::new("3"))
            .build()
    }

    fn navigator_at(graph: &StepGraph, address: &str) -> Navigator {
        Navigator::new(flatten(graph).unwrap(), Address::from(address))
    }

    #[tokio::test]
    async fn test_next_walks_forward_then_stops() {
        let graph = three_steps(Step::new("2").can_go_back(false));
        let bus = Bus::new();
        let mut nav = navigator_at(&graph, "1");

        assert_eq!(
            nav.next(&bus).await.unwrap(),
            Movement::Moved { from: "1".into(), to: "2".into() }
        );
        assert!(nav.next(&bus).await.unwrap().is_moved());
        assert_eq!(nav.current(), "3");
        assert_eq!(nav.next(&bus).await.unwrap(), Movement::AtBoundary);
        assert_eq!(nav.current(), "3");
    }

    #[tokio::test]
    async fn test_previous_blocked_by_current_record() {
        let graph = three_steps(Step::new("2").can_go_back(false));
        let bus = Bus::new();
        let mut nav = navigator_at(&graph, "2");

        assert!(!nav.can_go_back());
        assert_eq!(nav.previous(&bus).await.unwrap(), Movement::BackBlocked);
        assert_eq!(nav.current(), "2");
    }

    #[tokio::test]
    async fn test_previous_at_first_record_is_boundary() {
        let graph = StepGraph::builder("1")
            .step(Step::new("1").can_go_back(true).next("2"))
            .step(Step::new("2"))
            .build();
        let mut nav = navigator_at(&graph, "1");

        assert_eq!(nav.previous(&Bus::new()).await.unwrap(), Movement::AtBoundary);
    }

    #[tokio::test]
    async fn test_skipped_records_are_passed_both_ways() {
        let graph = three_steps(Step::new("2").skip_when(constant(true)));
        let bus = Bus::new();
        let mut nav = navigator_at(&graph, "1");

        nav.next(&bus).await.unwrap();
        assert_eq!(nav.current(), "3");
        nav.previous(&bus).await.unwrap();
        assert_eq!(nav.current(), "1");
    }

    #[tokio::test]
    async fn test_skipping_into_boundary_stays_put() {
        let graph = StepGraph::builder("1")
            .step(Step::new("1").next("2"))
            .step(Step::new("2").skip_when(constant(true)))
            .build();
        let mut nav = navigator_at(&graph, "1");

        assert_eq!(nav.next(&Bus::new()).await.unwrap(), Movement::AtBoundary);
        assert_eq!(nav.current(), "1");
    }

    #[tokio::test]
    async fn test_skipped_record_without_back_permission_blocks() {
        let graph = three_steps(Step::new("2").skip_when(constant(true)).can_go_back(false));
        let mut nav = navigator_at(&graph, "3");

        assert_eq!(nav.previous(&Bus::new()).await.unwrap(), Movement::BackBlocked);
        assert_eq!(nav.current(), "3");
    }

    #[tokio::test]
    async fn test_unknown_address_is_noop() {
        let graph = three_steps(Step::new("2"));
        let mut nav = navigator_at(&graph, "nowhere");

        assert!(nav.current_record().is_none());
        assert_eq!(nav.next(&Bus::new()).await.unwrap(), Movement::NotInSequence);
        assert_eq!(nav.previous(&Bus::new()).await.unwrap(), Movement::NotInSequence);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let graph = three_steps(Step::new("2"));
        let mut nav = navigator_at(&graph, "1");
        let mut rx = nav.subscribe();
        assert_eq!(*rx.borrow(), "1");

        nav.next(&Bus::new()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "2");

        nav.previous(&Bus::new()).await.unwrap();
        nav.previous(&Bus::new()).await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "1");
    }
}
