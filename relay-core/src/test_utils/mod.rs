//! Ready-made contexts and items for testing.
//!
//! Available behind the `test-utils` feature flag. Every item writes
//! `"<label>-before"` / `"<label>-after"` entries into a [`TraceContext`],
//! so tests can assert on the exact down/up ordering of a chain.

mod failing_item;
mod halting_item;
mod recording_item;
mod trace_context;

pub use failing_item::FailingItem;
pub use halting_item::HaltingItem;
pub use recording_item::RecordingItem;
pub use trace_context::TraceContext;
