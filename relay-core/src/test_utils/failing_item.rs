//! FailingItem — raises a handler failure.

use crate::error::PipelineError;
use crate::item::{Next, PipeItem};
use async_trait::async_trait;

use super::TraceContext;

/// Writes `"<label>-before"` and fails with [`PipelineError::Handler`]
/// carrying `message`.
#[derive(Debug, Clone)]
pub struct FailingItem {
    label: String,
    message: String,
}

impl FailingItem {
    /// Create an item that fails under `label` with `message`.
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl PipeItem<TraceContext> for FailingItem {
    async fn execute(
        &self,
        ctx: &mut TraceContext,
        _next: Next<'_, TraceContext>,
    ) -> Result<(), PipelineError> {
        ctx.record(format!("{}-before", self.label));
        Err(PipelineError::handler(self.message.clone()))
    }

    fn name(&self) -> &str {
        &self.label
    }
}
