//! Progress reporting.
//!
//! Pipelines report through a [`Reporter`] instead of printing, so callers
//! choose where messages go and tests can inspect them.

use crate::output::DocumentKind;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Counts gathered from one parsed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub decision_vars: usize,
    pub random_vars: usize,
    pub agents: usize,
    pub constraints: usize,
    pub events: usize,
}

/// Receiver for pipeline progress.
pub trait Reporter {
    /// The input was parsed.
    fn parsed(&self, source: &Path, stats: &ConversionStats);

    /// A document was written.
    fn saved(&self, kind: DocumentKind, path: &Path);
}

/// Forwards progress to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn parsed(&self, source: &Path, stats: &ConversionStats) {
        info!(
            source = %source.display(),
            decision_vars = stats.decision_vars,
            random_vars = stats.random_vars,
            agents = stats.agents,
            constraints = stats.constraints,
            events = stats.events,
            "Parsed input"
        );
    }

    fn saved(&self, kind: DocumentKind, path: &Path) {
        info!(kind = kind.label(), path = %path.display(), "Saved document");
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn push(&self, message: String) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}

impl Reporter for MemoryReporter {
    fn parsed(&self, source: &Path, stats: &ConversionStats) {
        self.push(format!(
            "parsed {}: {} decision, {} random, {} agents, {} constraints, {} events",
            source.display(),
            stats.decision_vars,
            stats.random_vars,
            stats.agents,
            stats.constraints,
            stats.events
        ));
    }

    fn saved(&self, kind: DocumentKind, path: &Path) {
        self.push(format!("saved {} {}", kind.label(), path.display()));
    }
}
