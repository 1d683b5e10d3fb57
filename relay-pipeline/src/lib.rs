#![deny(missing_docs)]
//! Chained pipeline executor and builder.
//!
//! [`PipelineBuilder`] collects item descriptors in execution order and
//! turns them into a [`ChainedPipeline`], constructing each item through
//! its factory. Factories pull constructor dependencies from an optional
//! [`Resolver`], falling back to default construction where the dependency
//! allows it.
//!
//! ```
//! use relay_core::test_utils::{RecordingItem, TraceContext};
//! use relay_pipeline::{Pipeline, PipelineBuilder};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut builder = PipelineBuilder::<TraceContext>::new();
//! builder
//!     .add_instance(RecordingItem::new("A"))
//!     .add_instance(RecordingItem::new("B"));
//! let pipeline = builder.build().unwrap();
//!
//! let mut ctx = TraceContext::new();
//! pipeline.execute(&mut ctx).await.unwrap();
//! assert_eq!(ctx.entries(), ["A-before", "B-before", "B-after", "A-after"]);
//! # });
//! ```

pub mod builder;
pub mod executor;
pub mod item_fn;
pub mod resolver;

pub use builder::{Construct, ItemDescriptor, PipelineBuilder};
pub use executor::ChainedPipeline;
pub use item_fn::{ItemFn, item_fn, named_item_fn};
pub use resolver::{Dependencies, Resolved, Resolver, ResolverFn, ServiceMap, resolver_fn};

pub use relay_core::{BoxFuture, DynPipeline, Next, PipeContext, PipeItem, Pipeline, PipelineError};
