//! The in-memory destination.

use std::sync::{Arc, Mutex};

use super::{Destination, SinkError, SinkErrorKind};

/// A destination that collects audit lines into an in-memory buffer.
///
/// Useful in tests and demonstrations where the log must be inspected
/// after the fact. Clones share the same buffer, so a clone kept outside
/// the sink observes every line the sink writes.
///
/// # Examples
///
/// ```
/// use call_audit::sink::{AuditSink, MemoryDestination};
///
/// let memory = MemoryDestination::new();
/// let sink = AuditSink::new().with_destination(memory.clone());
///
/// memory.with_lines(|lines| assert!(lines.is_empty()));
/// # let _ = sink;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryDestination {
    /// Creates an empty in-memory destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of collected lines.
    pub fn len(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }

    /// Returns `true` if no lines have been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Provides borrowed access to the lines via callback (zero-copy).
    ///
    /// # Panics
    ///
    /// Panics if a previous writer panicked while holding the buffer.
    pub fn with_lines<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[String]) -> R,
    {
        f(&self.lines.lock().expect("memory destination poisoned"))
    }

    /// Returns a snapshot of the collected lines.
    ///
    /// Clones the buffer; prefer [`with_lines`](Self::with_lines) when a
    /// borrowed view is enough.
    pub fn lines(&self) -> Vec<String> {
        self.with_lines(|lines| lines.to_vec())
    }

    /// Discards all collected lines.
    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl Destination for MemoryDestination {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| SinkError::new(SinkErrorKind::Poisoned))?;
        lines.push(line.to_string());
        Ok(())
    }
}
