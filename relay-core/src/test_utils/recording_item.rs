//! RecordingItem — records before and after running the continuation.

use crate::error::PipelineError;
use crate::item::{Next, PipeItem};
use async_trait::async_trait;

use super::TraceContext;

/// Writes `"<label>-before"`, runs the rest of the chain, then writes
/// `"<label>-after"`. A downstream failure propagates without the
/// `-after` entry.
#[derive(Debug, Clone)]
pub struct RecordingItem {
    label: String,
}

impl RecordingItem {
    /// Create an item that records under `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl PipeItem<TraceContext> for RecordingItem {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record(format!("{}-before", self.label));
        next.run(ctx).await?;
        ctx.record(format!("{}-after", self.label));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.label
    }
}
