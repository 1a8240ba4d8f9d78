//! Log sinks for validation diagnostics.
//!
//! The validator and parameters never log through a global: each one holds an
//! [`Arc<dyn LogSink>`] handed in by whoever drives the configuration run.
//! [`TracingSink`] forwards to `tracing`, [`MemorySink`] keeps the messages so
//! callers can inspect the exact wording.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;

/// Target used for every event emitted by [`TracingSink`].
pub const LOG_TARGET: &str = "anvil::validation";

/// Receives validation diagnostics at a given severity.
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Record a single message.
    fn log(&self, level: Level, message: &str);

    /// Record at error level.
    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    /// Record at warn level.
    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    /// Record at debug level.
    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    /// Record at trace level.
    fn trace(&self, message: &str) {
        self.log(Level::TRACE, message);
    }
}

/// Forwards diagnostics to the `tracing` subscriber installed by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Shared handle to a tracing sink, the default for new validators.
    #[must_use]
    pub fn shared() -> Arc<dyn LogSink> {
        Arc::new(Self)
    }
}

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: LOG_TARGET, "{message}"),
            Level::WARN => tracing::warn!(target: LOG_TARGET, "{message}"),
            Level::INFO => tracing::info!(target: LOG_TARGET, "{message}"),
            Level::DEBUG => tracing::debug!(target: LOG_TARGET, "{message}"),
            _ => tracing::trace!(target: LOG_TARGET, "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: Level, _message: &str) {}
}

/// A message captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

/// Keeps every diagnostic in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages logged at exactly `level`.
    #[must_use]
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Drop all captured entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_owned(),
        });
    }
}
