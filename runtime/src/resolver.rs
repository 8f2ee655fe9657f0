//! # Resolver: Picking the Starting Step
//!
//! At load time a flow must open on the first step that still needs the
//! user. The resolver walks the `next` chain, passing over steps whose
//! `is_done` or `should_skip` answers `true`, and descends into containers
//! through their child graph's `initial_step`.
//!
//! A passed step without a successor is still returned: there is nowhere
//! else to go.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::Instrument;
use waypoint_core::{Address, Bus, Result, Step, StepGraph};

/// Resolve the starting address from the graph's `initial_step`.
pub async fn resolve_first_step(graph: &StepGraph, bus: &Bus) -> Result<Address> {
    resolve_first_step_from(graph, graph.initial_step(), bus).await
}

/// Resolve the starting address from an explicit root step name.
///
/// `start` must name a step of the root graph; otherwise this fails with
/// `MissingStep`.
pub async fn resolve_first_step_from(graph: &StepGraph, start: &str, bus: &Bus) -> Result<Address> {
    let span = tracing::info_span!("Resolve", waypoint.start = %start);

    async move {
        let address = resolve_in(graph, start, None, bus).await?;
        tracing::info!(%address, "Resolved first step");
        Ok(address)
    }
    .instrument(span)
    .await
}

/// Walk one graph from `start`. Recursion happens only when entering a
/// container, so depth is bounded by nesting depth.
fn resolve_in<'a>(
    graph: &'a StepGraph,
    start: &'a str,
    scope: Option<&'a Address>,
    bus: &'a Bus,
) -> BoxFuture<'a, Result<Address>> {
    async move {
        let mut name = start;

        loop {
            let step = graph.lookup(name, scope)?;
            let address = Address::within(scope, step.name());

            if is_passed(step, bus).await? {
                match step.next_step() {
                    Some(next) => {
                        tracing::debug!(step = %address, next, "Passing over step");
                        name = next;
                        continue;
                    }
                    None => {
                        tracing::debug!(step = %address, "Keeping last step although passed");
                        return Ok(address);
                    }
                }
            }

            return match step.children() {
                Some(children) => {
                    tracing::debug!(step = %address, "Entering child steps");
                    resolve_in(children, children.initial_step(), Some(&address), bus).await
                }
                None => Ok(address),
            };
        }
    }
    .boxed()
}

/// `is_done` first; `should_skip` is only asked when the step is not done.
async fn is_passed(step: &Step, bus: &Bus) -> Result<bool> {
    Ok(step.is_done(bus).await? || step.should_skip(bus).await?)
}
