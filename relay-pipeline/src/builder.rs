//! Assembling a [`ChainedPipeline`] from item descriptors.
//!
//! Items are registered as descriptors, not instances: each descriptor
//! knows how to construct its item, and construction happens at
//! [`PipelineBuilder::build`] time, in registration order. The context type
//! is fixed when the builder is created, so an item written for another
//! context type is rejected by the compiler rather than at build time.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use relay_core::{PipeContext, PipeItem, PipelineError};

use crate::executor::ChainedPipeline;
use crate::resolver::{Dependencies, Resolver};

/// The single constructor of an item type.
///
/// Pull constructor arguments from `deps`: [`Dependencies::resolve`] for
/// dependencies with a default, [`Dependencies::require`] for ones without.
///
/// ```
/// use async_trait::async_trait;
/// use relay_pipeline::{Construct, Dependencies, Next, PipeContext, PipeItem, PipelineError};
///
/// #[derive(Clone, Default)]
/// struct TaxRate(u32);
///
/// struct Invoice {
///     net: u32,
///     gross: u32,
/// }
/// impl PipeContext for Invoice {}
///
/// struct ApplyTax {
///     rate: TaxRate,
/// }
///
/// impl Construct for ApplyTax {
///     fn construct(deps: &Dependencies<'_>) -> Result<Self, PipelineError> {
///         Ok(Self { rate: deps.resolve()? })
///     }
/// }
///
/// #[async_trait]
/// impl PipeItem<Invoice> for ApplyTax {
///     async fn execute(&self, ctx: &mut Invoice, next: Next<'_, Invoice>) -> Result<(), PipelineError> {
///         ctx.gross = ctx.net + ctx.net * self.rate.0 / 100;
///         next.run(ctx).await
///     }
/// }
/// ```
pub trait Construct: Sized {
    /// Build an instance, resolving dependencies through `deps`.
    fn construct(deps: &Dependencies<'_>) -> Result<Self, PipelineError>;
}

type ItemFactory<C> =
    Box<dyn Fn(&Dependencies<'_>) -> Result<Arc<dyn PipeItem<C>>, PipelineError> + Send + Sync>;

fn factory<C, F>(f: F) -> ItemFactory<C>
where
    C: PipeContext,
    F: Fn(&Dependencies<'_>) -> Result<Arc<dyn PipeItem<C>>, PipelineError> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Describes one registered item: its name and how to construct it.
pub struct ItemDescriptor<C: PipeContext> {
    name: String,
    factory: ItemFactory<C>,
}

impl<C: PipeContext> ItemDescriptor<C> {
    /// Construct `T` through its [`Construct`] impl.
    pub fn of<T>() -> Self
    where
        T: Construct + PipeItem<C> + 'static,
    {
        Self {
            name: type_name::<T>().to_string(),
            factory: factory(|deps| {
                let item = T::construct(deps)?;
                Ok(Arc::new(item) as Arc<dyn PipeItem<C>>)
            }),
        }
    }

    /// Construct `T` with `T::default()`.
    pub fn default_of<T>() -> Self
    where
        T: Default + PipeItem<C> + 'static,
    {
        Self {
            name: type_name::<T>().to_string(),
            factory: factory(|_| Ok(Arc::new(T::default()) as Arc<dyn PipeItem<C>>)),
        }
    }

    /// Construct the item with a caller-supplied factory.
    pub fn from_fn<T, F>(name: impl Into<String>, f: F) -> Self
    where
        T: PipeItem<C> + 'static,
        F: Fn(&Dependencies<'_>) -> Result<T, PipelineError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: factory(move |deps| Ok(Arc::new(f(deps)?) as Arc<dyn PipeItem<C>>)),
        }
    }

    /// Reuse an existing instance. Every build shares it.
    pub fn instance(item: Arc<dyn PipeItem<C>>) -> Self {
        Self {
            name: item.name().to_string(),
            factory: factory(move |_| Ok(Arc::clone(&item))),
        }
    }

    /// Name of the described item.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct the item, resolving dependencies through `resolver`.
    pub fn instantiate(
        &self,
        resolver: Option<&dyn Resolver>,
    ) -> Result<Arc<dyn PipeItem<C>>, PipelineError> {
        let deps = Dependencies::new(&self.name, resolver);
        (self.factory)(&deps)
    }
}

impl<C: PipeContext> fmt::Debug for ItemDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Collects item descriptors in execution order and builds executors.
///
/// The builder is reusable: every build constructs a fresh set of items
/// (except those registered with [`add_instance`](Self::add_instance) or
/// [`add_shared`](Self::add_shared), which are shared). Construction runs
/// whatever side effects the item constructors have; the builder does not
/// manage the lifetime of resources items acquire.
pub struct PipelineBuilder<C: PipeContext> {
    name: Option<String>,
    items: Vec<ItemDescriptor<C>>,
}

impl<C: PipeContext> PipelineBuilder<C> {
    /// Create an empty builder for context type `C`.
    pub fn new() -> Self {
        Self {
            name: None,
            items: Vec::new(),
        }
    }

    /// Create an empty builder whose pipelines carry `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            items: Vec::new(),
        }
    }

    /// Register `T`, constructed through its [`Construct`] impl.
    pub fn add_item<T>(&mut self) -> &mut Self
    where
        T: Construct + PipeItem<C> + 'static,
    {
        self.add_descriptor(ItemDescriptor::of::<T>())
    }

    /// Register `T`, constructed with `T::default()`.
    pub fn add_default<T>(&mut self) -> &mut Self
    where
        T: Default + PipeItem<C> + 'static,
    {
        self.add_descriptor(ItemDescriptor::default_of::<T>())
    }

    /// Register an item built by `f`.
    pub fn add_factory<T, F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        T: PipeItem<C> + 'static,
        F: Fn(&Dependencies<'_>) -> Result<T, PipelineError> + Send + Sync + 'static,
    {
        self.add_descriptor(ItemDescriptor::from_fn(name, f))
    }

    /// Register an already-constructed item.
    pub fn add_instance(&mut self, item: impl PipeItem<C> + 'static) -> &mut Self {
        self.add_shared(Arc::new(item))
    }

    /// Register an already-constructed, shared item.
    pub fn add_shared(&mut self, item: Arc<dyn PipeItem<C>>) -> &mut Self {
        self.add_descriptor(ItemDescriptor::instance(item))
    }

    /// Register a descriptor.
    pub fn add_descriptor(&mut self, descriptor: ItemDescriptor<C>) -> &mut Self {
        self.items.push(descriptor);
        self
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Registered item names, in execution order.
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(ItemDescriptor::name).collect()
    }

    /// Build without a resolver: every dependency falls back to default
    /// construction, and required dependencies fail.
    pub fn build(&self) -> Result<ChainedPipeline<C>, PipelineError> {
        self.build_inner(None)
    }

    /// Build, trying `resolver` first for every constructor dependency.
    pub fn build_with(&self, resolver: &dyn Resolver) -> Result<ChainedPipeline<C>, PipelineError> {
        self.build_inner(Some(resolver))
    }

    fn build_inner(
        &self,
        resolver: Option<&dyn Resolver>,
    ) -> Result<ChainedPipeline<C>, PipelineError> {
        if self.items.is_empty() {
            return Err(PipelineError::Configuration("pipeline is empty".into()));
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (position, descriptor) in self.items.iter().enumerate() {
            let item = descriptor.instantiate(resolver)?;
            tracing::debug!(position, item = descriptor.name(), "relay.item.constructed");
            items.push(item);
        }

        let mut pipeline = ChainedPipeline::new(items)?;
        if let Some(name) = &self.name {
            pipeline = pipeline.with_name(name.clone());
        }
        tracing::debug!(
            pipeline = self.name.as_deref().unwrap_or("unnamed"),
            context = type_name::<C>(),
            items = pipeline.len(),
            "relay.pipeline.built"
        );
        Ok(pipeline)
    }
}

impl<C: PipeContext> Default for PipelineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PipeContext> fmt::Debug for PipelineBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("items", &self.item_names())
            .finish()
    }
}
