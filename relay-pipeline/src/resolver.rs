//! Dependency resolution for item constructors.
//!
//! A [`Resolver`] is an opaque lookup from a type to an instance, the role
//! a dependency-injection container plays. [`ServiceMap`] is the bundled
//! implementation; any closure can act as one through [`resolver_fn`].
//! Item constructors never see the resolver directly. They receive
//! [`Dependencies`], which applies the resolver-first, default-second rule.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use relay_core::PipelineError;

/// A value produced by a [`Resolver`], tagged with its type name.
pub struct Resolved {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl Resolved {
    /// Wrap a value for return from a resolver.
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Take the value out as `T`, or report what was there instead.
    pub fn downcast<T: 'static>(self) -> Result<T, PipelineError> {
        let found = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| PipelineError::TypeMismatch {
                expected: type_name::<T>().to_string(),
                found: found.to_string(),
            })
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Looks up an instance for a requested type.
///
/// Returning `None` means "no registration"; the caller then decides
/// whether default construction is possible.
pub trait Resolver: Send + Sync {
    /// Produce an instance of the type identified by `ty`.
    fn resolve(&self, ty: TypeId) -> Option<Resolved>;
}

/// A [`Resolver`] backed by a closure. Created with [`resolver_fn`].
pub struct ResolverFn<F> {
    f: F,
}

impl<F> Resolver for ResolverFn<F>
where
    F: Fn(TypeId) -> Option<Resolved> + Send + Sync,
{
    fn resolve(&self, ty: TypeId) -> Option<Resolved> {
        (self.f)(ty)
    }
}

/// Use a closure as a resolver.
///
/// ```
/// use std::any::TypeId;
/// use relay_pipeline::{Resolved, resolver_fn};
///
/// let resolver = resolver_fn(|ty| {
///     (ty == TypeId::of::<u32>()).then(|| Resolved::new(42u32))
/// });
/// # let _ = resolver;
/// ```
pub fn resolver_fn<F>(f: F) -> ResolverFn<F>
where
    F: Fn(TypeId) -> Option<Resolved> + Send + Sync,
{
    ResolverFn { f }
}

type Factory = Box<dyn Fn() -> Resolved + Send + Sync>;

/// A registration table mapping types to instance factories.
///
/// Each lookup produces a fresh value: [`insert`](Self::insert) clones the
/// registered value, [`insert_with`](Self::insert_with) calls the factory.
/// Registering a type twice replaces the earlier registration.
#[derive(Default)]
pub struct ServiceMap {
    factories: HashMap<TypeId, (&'static str, Factory)>,
}

impl ServiceMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value`; every lookup of `T` returns a clone of it.
    ///
    /// Share a single instance by registering an `Arc<T>`.
    pub fn insert<T>(&mut self, value: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.insert_with(move || value.clone())
    }

    /// Register a factory invoked on every lookup of `T`.
    pub fn insert_with<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.insert(
            TypeId::of::<T>(),
            (type_name::<T>(), Box::new(move || Resolved::new(factory()))),
        );
        self
    }

    /// True if `T` has a registration.
    pub fn contains<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Resolver for ServiceMap {
    fn resolve(&self, ty: TypeId) -> Option<Resolved> {
        self.factories.get(&ty).map(|(_, factory)| factory())
    }
}

impl fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("ServiceMap").field("types", &names).finish()
    }
}

/// The constructor-side view of a resolver, scoped to one item.
///
/// Handed to every item factory during a build. Lookups go to the resolver
/// first; what happens when it has no registration depends on the method.
pub struct Dependencies<'r> {
    item: &'r str,
    resolver: Option<&'r dyn Resolver>,
}

impl<'r> Dependencies<'r> {
    /// Scope lookups to the item named `item`.
    pub fn new(item: &'r str, resolver: Option<&'r dyn Resolver>) -> Self {
        Self { item, resolver }
    }

    /// Name of the item being constructed.
    pub fn item(&self) -> &str {
        self.item
    }

    /// True if the build was given a resolver.
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// The resolver's instance of `T`, or `T::default()` when it has none.
    pub fn resolve<T: Default + 'static>(&self) -> Result<T, PipelineError> {
        match self.lookup::<T>()? {
            Some(value) => Ok(value),
            None => {
                tracing::trace!(
                    item = self.item,
                    dependency = type_name::<T>(),
                    "relay.dependency.default"
                );
                Ok(T::default())
            }
        }
    }

    /// The resolver's instance of `T`, or `MissingDependency` when it has
    /// none. For dependencies with no sensible default.
    pub fn require<T: 'static>(&self) -> Result<T, PipelineError> {
        self.lookup::<T>()?
            .ok_or_else(|| PipelineError::MissingDependency {
                item: self.item.to_string(),
                dependency: type_name::<T>().to_string(),
            })
    }

    /// The resolver's instance of `T`, if it has one.
    pub fn optional<T: 'static>(&self) -> Result<Option<T>, PipelineError> {
        self.lookup::<T>()
    }

    fn lookup<T: 'static>(&self) -> Result<Option<T>, PipelineError> {
        let Some(resolver) = self.resolver else {
            return Ok(None);
        };
        match resolver.resolve(TypeId::of::<T>()) {
            Some(resolved) => {
                tracing::trace!(
                    item = self.item,
                    dependency = type_name::<T>(),
                    "relay.dependency.resolved"
                );
                resolved.downcast::<T>().map(Some)
            }
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Dependencies<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("item", &self.item)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}
