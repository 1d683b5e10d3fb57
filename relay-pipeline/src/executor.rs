//! The chained executor.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use relay_core::{
    DynPipeline, Next, PipeContext, PipeItem, Pipeline, PipelineError, downcast_context,
};
use tracing::Instrument;

/// An ordered, immutable chain of items bound to context type `C`.
///
/// Every call to [`Pipeline::execute`] starts a fresh [`Next`] at the head
/// of the chain, so sequential calls restart from the first item and
/// overlapping calls on one executor (or on clones of it) never share a
/// cursor. Cloning is cheap; clones share the same item instances.
pub struct ChainedPipeline<C: PipeContext> {
    name: Option<Arc<str>>,
    items: Arc<[Arc<dyn PipeItem<C>>]>,
}

impl<C: PipeContext> ChainedPipeline<C> {
    /// Bind `items` into an executor, in order.
    ///
    /// An empty list is a configuration error, not a no-op pipeline.
    pub fn new(items: Vec<Arc<dyn PipeItem<C>>>) -> Result<Self, PipelineError> {
        if items.is_empty() {
            return Err(PipelineError::Configuration("pipeline is empty".into()));
        }
        Ok(Self {
            name: None,
            items: items.into(),
        })
    }

    /// Attach a name, reported in traces and `Debug` output.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    /// The pipeline's name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of items in the chain.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: an executor cannot be built without items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item names in execution order.
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name()).collect()
    }

    /// Erase the context type, for callers that only hold a
    /// `dyn PipeContext`.
    pub fn into_dyn(self) -> Arc<dyn DynPipeline> {
        Arc::new(self)
    }
}

impl<C: PipeContext> Clone for ChainedPipeline<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            items: Arc::clone(&self.items),
        }
    }
}

impl<C: PipeContext> fmt::Debug for ChainedPipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedPipeline")
            .field("name", &self.name)
            .field("items", &self.item_names())
            .finish()
    }
}

#[async_trait]
impl<C: PipeContext> Pipeline<C> for ChainedPipeline<C> {
    async fn execute(&self, ctx: &mut C) -> Result<(), PipelineError> {
        let span = tracing::debug_span!(
            "relay.pipeline.execute",
            pipeline = self.name.as_deref().unwrap_or("unnamed"),
            items = self.items.len()
        );
        Next::new(&self.items).run(ctx).instrument(span).await
    }
}

#[async_trait]
impl<C: PipeContext> DynPipeline for ChainedPipeline<C> {
    fn context_type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    async fn execute_dyn(&self, ctx: &mut dyn PipeContext) -> Result<(), PipelineError> {
        let ctx = downcast_context::<C>(ctx)?;
        Pipeline::execute(self, ctx).await
    }
}
