//! The context contract — the payload threaded through one execution.

use std::any::Any;

/// A payload that can flow through a pipeline.
///
/// Any `Send + 'static` type opts in with an empty impl:
///
/// ```
/// use relay_core::PipeContext;
///
/// #[derive(Default)]
/// struct Checkout {
///     total_cents: u64,
/// }
///
/// impl PipeContext for Checkout {}
/// ```
///
/// The engine never constructs or drops a context. It borrows the caller's
/// value mutably for one execution and hands that same borrow to every item.
pub trait PipeContext: AsAnyMut + Send + 'static {}

/// Narrows a `dyn PipeContext` back to its concrete type.
///
/// Blanket-implemented for every sized `'static` type. Callers never
/// implement this by hand.
pub trait AsAnyMut {
    /// Borrow `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The concrete type's name, used in mismatch errors.
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any> AsAnyMut for T {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
