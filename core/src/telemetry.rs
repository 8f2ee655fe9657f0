//! # Telemetry: Observability Decorators
//!
//! This module provides decorators for adding observability to Predicates.

use crate::bus::Bus;
use crate::predicate::Predicate;
use async_trait::async_trait;

/// A wrapper Predicate that adds tracing to any inner Predicate.
///
/// Every evaluation runs in a `Predicate` span carrying the predicate's name
/// and reports its answer and duration.
#[derive(Clone)]
pub struct Traced<P> {
    inner: P,
    name: String,
}

impl<P> Traced<P> {
    pub fn new(inner: P, name: &str) -> Self {
        Self {
            inner,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P> Predicate for Traced<P>
where
    P: Predicate,
{
    async fn evaluate(&self, bus: &Bus) -> anyhow::Result<bool> {
        use tracing::{Instrument, info_span};

        let span = info_span!("Predicate", waypoint.predicate = %self.name);

        async move {
            let start = std::time::Instant::now();
            let result = self.inner.evaluate(bus).await;
            let duration = start.elapsed();

            match &result {
                Ok(answer) => tracing::debug!(answer, ?duration, "Predicate evaluated"),
                Err(e) => tracing::error!(error = %e, ?duration, "Predicate failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
