//! # relay-core — contracts for chained handler pipelines
//!
//! This crate defines the protocol a relay pipeline is built from. It holds
//! no executor and no builder; those live in `relay-pipeline`.
//!
//! ## The Contracts
//!
//! | Contract | Type | What it does |
//! |----------|------|-------------|
//! | Context | [`PipeContext`] | Opts a payload type into being pipeline state |
//! | Handler | [`PipeItem`] | Processes a context, decides whether to call [`Next`] |
//! | Continuation | [`Next`] | The remainder of the chain, consumed on use |
//! | Executor (typed) | [`Pipeline`] | Runs a chain against a context of type `C` |
//! | Executor (erased) | [`DynPipeline`] | Same executor, reached through `dyn PipeContext` |
//!
//! ## Execution Model
//!
//! A chain is strictly sequential. Each item receives the context and a
//! [`Next`]; work done before `next.run(ctx)` happens on the way down, work
//! done after it happens on the way up, in reverse registration order. An
//! item that returns without running `next` short-circuits every item
//! registered after it.
//!
//! The chain position lives inside each [`Next`] value rather than on the
//! executor, so one executor can drive any number of overlapping
//! executions.
//!
//! ## Native Async Traits
//!
//! The contracts use `async-trait` so that heterogeneous handlers can sit in
//! one `Vec<Arc<dyn PipeItem<C>>>`. Closure-backed handlers use
//! [`BoxFuture`] directly.

#![deny(missing_docs)]

pub mod context;
pub mod error;
pub mod item;
pub mod pipeline;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use context::{AsAnyMut, PipeContext};
pub use error::PipelineError;
pub use item::{BoxFuture, Next, PipeItem};
pub use pipeline::{DynPipeline, Pipeline, downcast_context};
