//! HaltingItem — never runs its continuation.

use crate::error::PipelineError;
use crate::item::{Next, PipeItem};
use async_trait::async_trait;

use super::TraceContext;

/// Writes `"<label>-before"` and `"<label>-after"` and drops `next`,
/// so nothing registered after it runs.
#[derive(Debug, Clone)]
pub struct HaltingItem {
    label: String,
}

impl HaltingItem {
    /// Create an item that halts under `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl PipeItem<TraceContext> for HaltingItem {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        _next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record(format!("{}-before", self.label));
        ctx.record(format!("{}-after", self.label));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.label
    }
}
