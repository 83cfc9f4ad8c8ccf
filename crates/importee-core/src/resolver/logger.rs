//! Warning sink for unresolved specifiers.

use std::sync::{Arc, Mutex, PoisonError};

/// Receives warnings from the resolver. Fire-and-forget.
pub trait Logger: Send + Sync {
    fn warn(&self, message: &str);
}

impl<L: Logger + ?Sized> Logger for &L {
    fn warn(&self, message: &str) {
        (**self).warn(message);
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn warn(&self, message: &str) {
        (**self).warn(message);
    }
}

/// Forwards warnings to `tracing` under the `importee` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "importee", "{message}");
    }
}

/// Records warnings in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<String>>,
}

impl MemoryLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings recorded so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop all recorded warnings.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Logger for MemoryLogger {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
