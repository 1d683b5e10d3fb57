//! Error taxonomy for building and running pipelines.

use thiserror::Error;

/// Everything that can go wrong while building or executing a pipeline.
///
/// Build-time variants (`Configuration`, `Instantiation`,
/// `MissingDependency`) abort construction and no executor is returned.
/// `TypeMismatch` is raised at the call boundary before any item runs.
/// `Handler` carries whatever an item raised; the engine never retries or
/// swallows it.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline definition itself is unusable (e.g. no items).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An item could not be constructed.
    #[error("cannot instantiate {item}: {reason}")]
    Instantiation {
        /// Name of the item type being built.
        item: String,
        /// Why construction failed.
        reason: String,
    },

    /// An item's constructor needs a dependency that the resolver does not
    /// provide and that has no default construction.
    #[error("cannot instantiate {item}: unresolved dependency {dependency}")]
    MissingDependency {
        /// Name of the item type being built.
        item: String,
        /// Type name of the missing dependency.
        dependency: String,
    },

    /// A value of the wrong concrete type reached a typed boundary.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type the boundary requires.
        expected: String,
        /// The type that was supplied.
        found: String,
    },

    /// Failure raised by an item, before or after running its continuation.
    #[error("handler failed: {0}")]
    Handler(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PipelineError {
    /// Wrap any error (or message) raised inside an item.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(err.into())
    }

    /// Shorthand for [`PipelineError::Instantiation`].
    pub fn instantiation(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// True for every variant that means "an item could not be constructed".
    pub fn is_instantiation(&self) -> bool {
        matches!(
            self,
            Self::Instantiation { .. } | Self::MissingDependency { .. }
        )
    }
}
