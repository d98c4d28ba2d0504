// src/diagnostics.rs

//! Diagnostic sinks for the extraction pipeline.
//!
//! The pipeline never logs globally; every stage reports through a sink
//! handed in by the caller. At runtime that is [`LogSink`], which forwards
//! to the `log` facade. Tests use [`MemorySink`] and assert on the entries.

use std::sync::Mutex;

use log::Level;

/// Receiver for pipeline diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Sink that forwards to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "ipo_feed::pipeline", level, "{message}");
    }
}

/// Sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of entries at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.entries().iter().filter(|d| d.level == level).count()
    }

    /// Whether any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|d| d.message.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Diagnostic {
                level,
                message: message.to_string(),
            });
    }
}
