//! Test utilities for Waypoint steppers.
//!
//! * [`Probe`]: a predicate whose answer can be flipped mid-test and which
//!   counts its evaluations, optionally appending to a shared [`EvalLog`].
//! * [`Failing`]: a predicate that always errors.
//! * [`linear_graph`]: `a -> b -> c` graphs without predicates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use waypoint_core::{Bus, Predicate, SharedPredicate, Step, StepGraph};

/// Ordered record of probe evaluations shared by several probes.
#[derive(Clone, Default, Debug)]
pub struct EvalLog(Arc<Mutex<Vec<String>>>);

impl EvalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    fn push(&self, label: &str) {
        self.0.lock().push(label.to_string());
    }
}

#[derive(Clone, Debug)]
pub struct Probe {
    label: String,
    answer: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    log: Option<EvalLog>,
}

impl Probe {
    pub fn new(label: impl Into<String>, answer: bool) -> Self {
        Probe {
            label: label.into(),
            answer: Arc::new(AtomicBool::new(answer)),
            calls: Arc::new(AtomicUsize::new(0)),
            log: None,
        }
    }

    pub fn logging_to(mut self, log: &EvalLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Change the answer for subsequent evaluations.
    pub fn set(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A shared handle evaluating this probe. Clones share answer and count.
    pub fn shared(&self) -> SharedPredicate {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Predicate for Probe {
    async fn evaluate(&self, _bus: &Bus) -> anyhow::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.push(&self.label);
        }
        // Suspend once so callers exercise a real await point.
        tokio::task::yield_now().await;
        Ok(self.answer.load(Ordering::SeqCst))
    }
}

/// A predicate that always fails with `message`.
#[derive(Clone, Debug)]
pub struct Failing(pub String);

impl Failing {
    pub fn shared(message: impl Into<String>) -> SharedPredicate {
        Arc::new(Failing(message.into()))
    }
}

#[async_trait]
impl Predicate for Failing {
    async fn evaluate(&self, _bus: &Bus) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("{}", self.0))
    }
}

/// `names[0] -> names[1] -> ...` with no predicates or overrides.
///
/// # Panics
/// Panics if `names` is empty.
pub fn linear_graph(names: &[&str]) -> StepGraph {
    assert!(!names.is_empty(), "linear_graph needs at least one step");
    linear_steps(names, |step| step)
}

/// Like [`linear_graph`], letting the caller decorate each step.
pub fn linear_steps(names: &[&str], mut decorate: impl FnMut(Step) -> Step) -> StepGraph {
    let steps = names.iter().enumerate().map(|(i, name)| {
        let step = Step::new(*name);
        let step = match names.get(i + 1) {
            Some(next) => step.next(*next),
            None => step,
        };
        decorate(step)
    });
    let steps: Vec<Step> = steps.collect();
    StepGraph::builder(names.first().copied().unwrap_or_default())
        .steps(steps)
        .build()
}
