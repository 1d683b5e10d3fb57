//! Closure-backed pipeline items.
//!
//! The pattern is identical to axum's `from_fn`: the closure receives the
//! context and a [`Next`], and returns a boxed future.

use async_trait::async_trait;
use relay_core::{BoxFuture, Next, PipeContext, PipeItem, PipelineError};

/// A [`PipeItem`] backed by a closure. Created with [`item_fn`] or
/// [`named_item_fn`].
pub struct ItemFn<F> {
    name: String,
    f: F,
}

impl<F> ItemFn<F> {
    /// Override the name reported in traces and `item_names()`.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl<C, F> PipeItem<C> for ItemFn<F>
where
    C: PipeContext,
    F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, Result<(), PipelineError>> + Send + Sync,
{
    async fn execute(&self, ctx: &mut C, next: Next<'_, C>) -> Result<(), PipelineError> {
        (self.f)(ctx, next).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Create a pipeline item from a closure.
///
/// The closure must return a `Box::pin(async move { ... })` future.
/// Annotate the context parameter so the context type is known.
///
/// # Example
///
/// ```ignore
/// use relay_pipeline::*;
///
/// let timing = item_fn(|ctx: &mut Request, next| {
///     Box::pin(async move {
///         let started = std::time::Instant::now();
///         let result = next.run(ctx).await;
///         ctx.elapsed = started.elapsed();
///         result
///     })
/// })
/// .named("timing");
/// ```
#[must_use]
pub fn item_fn<C, F>(f: F) -> ItemFn<F>
where
    C: PipeContext,
    F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, Result<(), PipelineError>> + Send + Sync,
{
    ItemFn {
        name: std::any::type_name::<F>().to_string(),
        f,
    }
}

/// Create a pipeline item from a closure, reported under `name`.
///
/// Shorthand for `item_fn(f).named(name)`.
#[must_use]
pub fn named_item_fn<C, F>(name: impl Into<String>, f: F) -> ItemFn<F>
where
    C: PipeContext,
    F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, Result<(), PipelineError>> + Send + Sync,
{
    item_fn::<C, F>(f).named(name)
}
