//! The handler contract and the continuation it receives.
//!
//! The pattern matches axum's `from_fn` middleware: every item receives a
//! [`Next`] that it can run to continue the chain, or drop to short-circuit.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::PipeContext;
use crate::error::PipelineError;

/// A boxed, `Send` future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One link in a pipeline.
///
/// An item can:
/// - inspect or mutate the context before running `next`
/// - short-circuit by returning without running `next`
/// - inspect or mutate the context after `next` returns, once every
///   downstream item has finished
/// - observe a downstream failure as the result of `next.run(..)` and react
///   before propagating it
///
/// Items are shared read-only across executions (`&self`). Per-execution
/// state belongs in the context.
///
/// ```
/// use async_trait::async_trait;
/// use relay_core::{Next, PipeContext, PipeItem, PipelineError};
///
/// struct Order {
///     audit: Vec<&'static str>,
/// }
/// impl PipeContext for Order {}
///
/// struct Audit;
///
/// #[async_trait]
/// impl PipeItem<Order> for Audit {
///     async fn execute(&self, ctx: &mut Order, next: Next<'_, Order>) -> Result<(), PipelineError> {
///         ctx.audit.push("start");
///         next.run(ctx).await?;
///         ctx.audit.push("done");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait PipeItem<C: PipeContext>: Send + Sync {
    /// Process `ctx`, optionally delegating to the rest of the chain.
    async fn execute(&self, ctx: &mut C, next: Next<'_, C>) -> Result<(), PipelineError>;

    /// Name used in traces and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The remainder of the chain.
///
/// Consumed by [`Next::run`], so an item cannot resume the chain twice.
/// The position is carried by value from one `Next` to the one it hands
/// the following item, which keeps the cursor local to one execution.
///
/// ```compile_fail,E0382
/// use relay_core::{Next, PipeContext, PipelineError};
///
/// async fn twice<C: PipeContext>(ctx: &mut C, next: Next<'_, C>) -> Result<(), PipelineError> {
///     next.run(ctx).await?;
///     next.run(ctx).await
/// }
/// ```
pub struct Next<'a, C: PipeContext> {
    items: &'a [Arc<dyn PipeItem<C>>],
    position: usize,
}

impl<'a, C: PipeContext> Next<'a, C> {
    /// Start a chain at the head of `items`.
    pub fn new(items: &'a [Arc<dyn PipeItem<C>>]) -> Self {
        Self { items, position: 0 }
    }

    /// Index of the item this continuation will invoke.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of items that have not run yet.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Continue the chain: invoke the next item, or complete if none remain.
    pub async fn run(self, ctx: &mut C) -> Result<(), PipelineError> {
        match self.items.split_first() {
            Some((head, tail)) => {
                tracing::trace!(
                    position = self.position,
                    item = head.name(),
                    "relay.item.enter"
                );
                let next = Next {
                    items: tail,
                    position: self.position + 1,
                };
                head.execute(ctx, next).await
            }
            None => {
                tracing::trace!(position = self.position, "relay.chain.exhausted");
                Ok(())
            }
        }
    }
}

impl<C: PipeContext> fmt::Debug for Next<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("remaining", &self.items.len())
            .finish()
    }
}
