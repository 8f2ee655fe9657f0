//! Predicate - Async Step Conditions
//!
//! A step may carry two predicates: `is_done` (the step is already
//! satisfied) and `should_skip` (the step must be bypassed). Either may need
//! I/O to answer, so the contract is async. Predicates read caller state
//! from the [`Bus`] and never mutate it.

use crate::bus::Bus;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::sync::Arc;

/// The contract for a step condition.
#[async_trait]
pub trait Predicate: Send + Sync + 'static {
    /// Evaluate the condition. Errors are propagated to whoever asked.
    async fn evaluate(&self, bus: &Bus) -> anyhow::Result<bool>;
}

/// Predicates are shared between the step graph and the flattened
/// sequence, so they live behind an `Arc`.
pub type SharedPredicate = Arc<dyn Predicate>;

#[async_trait]
impl<P> Predicate for Arc<P>
where
    P: Predicate + ?Sized,
{
    async fn evaluate(&self, bus: &Bus) -> anyhow::Result<bool> {
        (**self).evaluate(bus).await
    }
}

/// Evaluate an optional predicate; an absent predicate answers `false`.
pub async fn evaluate_or_false(
    predicate: Option<&SharedPredicate>,
    bus: &Bus,
) -> anyhow::Result<bool> {
    match predicate {
        Some(predicate) => predicate.evaluate(bus).await,
        None => Ok(false),
    }
}

/// A predicate with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant(pub bool);

#[async_trait]
impl Predicate for Constant {
    async fn evaluate(&self, _bus: &Bus) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}

/// Synchronous closure predicate, see [`from_fn`] and [`try_from_fn`].
pub struct FnPredicate<F>(F);

#[async_trait]
impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Bus) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    async fn evaluate(&self, bus: &Bus) -> anyhow::Result<bool> {
        (self.0)(bus)
    }
}

/// Async closure predicate, see [`from_async_fn`].
pub struct AsyncFnPredicate<F>(F);

#[async_trait]
impl<F> Predicate for AsyncFnPredicate<F>
where
    F: for<'a> Fn(&'a Bus) -> BoxFuture<'a, anyhow::Result<bool>> + Send + Sync + 'static,
{
    async fn evaluate(&self, bus: &Bus) -> anyhow::Result<bool> {
        (self.0)(bus).await
    }
}

/// Share a fixed answer.
pub fn constant(value: bool) -> SharedPredicate {
    Arc::new(Constant(value))
}

/// Wrap an infallible synchronous check.
///
/// ```rust
/// use waypoint_core::predicate;
///
/// struct Profile { complete: bool }
///
/// let done = predicate::from_fn(|bus| {
///     bus.get::<Profile>().is_some_and(|p| p.complete)
/// });
/// # let _ = done;
/// ```
pub fn from_fn<F>(check: F) -> SharedPredicate
where
    F: Fn(&Bus) -> bool + Send + Sync + 'static,
{
    Arc::new(FnPredicate(move |bus: &Bus| -> anyhow::Result<bool> {
        Ok(check(bus))
    }))
}

/// Wrap a fallible synchronous check.
pub fn try_from_fn<F>(check: F) -> SharedPredicate
where
    F: Fn(&Bus) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Arc::new(FnPredicate(check))
}

/// Wrap an async check returning a boxed future.
///
/// ```rust,ignore
/// let verified = predicate::from_async_fn(|bus| {
///     Box::pin(async move {
///         let client = bus.require::<AccountClient>()?;
///         Ok(client.email_verified().await?)
///     })
/// });
/// ```
pub fn from_async_fn<F>(check: F) -> SharedPredicate
where
    F: for<'a> Fn(&'a Bus) -> BoxFuture<'a, anyhow::Result<bool>> + Send + Sync + 'static,
{
    Arc::new(AsyncFnPredicate(check))
}
