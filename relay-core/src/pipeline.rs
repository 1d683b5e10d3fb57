//! Executor contracts, typed and type-erased.

use async_trait::async_trait;

use crate::context::PipeContext;
use crate::error::PipelineError;

/// Runs a chain of items against a context of type `C`.
#[async_trait]
pub trait Pipeline<C: PipeContext>: Send + Sync {
    /// Drive the chain from its head until it completes, short-circuits,
    /// or an item fails.
    async fn execute(&self, ctx: &mut C) -> Result<(), PipelineError>;
}

/// A pipeline reached without knowing its context type statically.
///
/// Implementations must reject a context of the wrong concrete type with
/// [`PipelineError::TypeMismatch`] before any item runs.
#[async_trait]
pub trait DynPipeline: Send + Sync {
    /// Name of the context type this pipeline accepts.
    fn context_type_name(&self) -> &'static str;

    /// Execute against a type-erased context.
    async fn execute_dyn(&self, ctx: &mut dyn PipeContext) -> Result<(), PipelineError>;
}

/// Narrow a type-erased context to `C`, or fail with `TypeMismatch`.
pub fn downcast_context<C: PipeContext>(
    ctx: &mut dyn PipeContext,
) -> Result<&mut C, PipelineError> {
    // Deref first: the blanket `AsAnyMut` impl would otherwise match the
    // reference itself.
    let found = (*ctx).concrete_type_name();
    (*ctx)
        .as_any_mut()
        .downcast_mut::<C>()
        .ok_or_else(|| PipelineError::TypeMismatch {
            expected: std::any::type_name::<C>().to_string(),
            found: found.to_string(),
        })
}
