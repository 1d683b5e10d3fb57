//! TraceContext — a context that is just an ordered log.

use crate::context::PipeContext;

/// A context whose only state is the log items append to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// Entries in the order they were written.
    pub log: Vec<String>,
}

impl TraceContext {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&mut self, entry: impl Into<String>) {
        self.log.push(entry.into());
    }

    /// The log as string slices, convenient for `assert_eq!` against arrays.
    pub fn entries(&self) -> Vec<&str> {
        self.log.iter().map(String::as_str).collect()
    }
}

impl PipeContext for TraceContext {}
