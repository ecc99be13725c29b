//! The audit sink: formatting and durable fan-out of audit lines.
//!
//! This module provides:
//! - `SinkError`: why a destination could not be written
//! - `Destination`: the pluggable write target trait
//! - `AuditSink`: the fan-out writer feeding every registered destination
//! - `format_line` / `parse_line`: the one fixed line format and its inverse
//!
//! Every accepted record is written and flushed to every destination
//! before control returns to the caller; a write failure is an error, not
//! a silently dropped line.

mod console;
mod file;
mod memory;

pub use console::ConsoleDestination;
pub use file::FileDestination;
pub use memory::MemoryDestination;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::record::AuditRecord;

/// The fixed, locale-independent timestamp format used in audit lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The level marker carried by every audit line.
///
/// `Info` tags audit records and toggle events; `Console` tags terminal
/// output mirrored into the file by [`ConsoleMirror`](crate::ConsoleMirror),
/// so combined logs remain attributable to their origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    /// An audit record or other informational event.
    Info,
    /// Mirrored terminal output.
    Console,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditLevel::Info => write!(f, "INFO"),
            AuditLevel::Console => write!(f, "CONSOLE"),
        }
    }
}

/// Error returned when a destination cannot be written.
///
/// # Examples
///
/// ```
/// use call_audit::sink::{SinkError, SinkErrorKind};
///
/// let error = SinkError::with_message(SinkErrorKind::Io, "disk full");
/// assert_eq!(error.kind(), SinkErrorKind::Io);
/// assert_eq!(error.message(), Some("disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    kind: SinkErrorKind,
    message: Option<String>,
}

impl SinkError {
    /// Creates a new sink error with the specified kind.
    pub fn new(kind: SinkErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a new sink error with a custom message.
    pub fn with_message(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SinkErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "sink error ({}): {}", self.kind, msg)
        } else {
            write!(f, "sink error ({})", self.kind)
        }
    }
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::with_message(SinkErrorKind::Io, e.to_string())
    }
}

/// Kind of sink error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// I/O error while opening, writing, or flushing a destination.
    Io,
    /// A destination's guarded handle was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for SinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Poisoned => write!(f, "poisoned handle"),
        }
    }
}

/// A pluggable write target for formatted audit lines.
///
/// Implementations must write the line followed by a newline and flush
/// before returning, so that the line survives a process crash
/// immediately after the call. Destinations are shared across wrapper
/// closures, hence the `Send + Sync` bound and the `&self` receiver.
pub trait Destination: Send + Sync {
    /// Appends one formatted line, newline-terminated and flushed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the destination cannot be written; the
    /// line must never be dropped silently.
    fn append_line(&self, line: &str) -> Result<(), SinkError>;
}

impl<D: Destination + ?Sized> Destination for Arc<D> {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        (**self).append_line(line)
    }
}

/// Formats one audit line: `<timestamp> - <LEVEL> - <message>`.
///
/// The returned line carries no trailing newline; destinations add it.
pub fn format_line(timestamp: DateTime<Local>, level: AuditLevel, message: &str) -> String {
    format!("{} - {} - {}", timestamp.format(TIMESTAMP_FORMAT), level, message)
}

/// A line parsed back out of the audit format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// The line's timestamp.
    pub timestamp: NaiveDateTime,
    /// The level marker, e.g. `INFO` or `CONSOLE`.
    pub level: String,
    /// The message, everything after the level separator.
    pub message: String,
}

/// Parses a line previously produced by [`format_line`].
///
/// Returns `None` if the line does not match
/// `<timestamp> - <LEVEL> - <message>`. The message itself may contain
/// the ` - ` separator; only the first two occurrences delimit fields.
///
/// # Examples
///
/// ```
/// use call_audit::sink::parse_line;
///
/// let parsed = parse_line("2026-08-05 14:30:00 - INFO - call: start, args: [], named: {}")
///     .expect("line should parse");
/// assert_eq!(parsed.level, "INFO");
/// assert_eq!(parsed.message, "call: start, args: [], named: {}");
/// ```
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let mut parts = line.splitn(3, " - ");
    let timestamp = NaiveDateTime::parse_from_str(parts.next()?, TIMESTAMP_FORMAT).ok()?;
    let level = parts.next()?.to_string();
    let message = parts.next()?.to_string();
    Some(ParsedLine {
        timestamp,
        level,
        message,
    })
}

/// The fan-out writer that feeds every registered destination.
///
/// A sink owns zero or more [`Destination`]s. [`record`](Self::record)
/// formats the audit line once and appends it to each destination in
/// registration order, synchronously; the first failing destination
/// aborts the fan-out and its error propagates to the caller.
///
/// # Examples
///
/// ```
/// use call_audit::sink::{AuditSink, MemoryDestination};
/// use call_audit::{AuditRecord, CallArgs};
///
/// let memory = MemoryDestination::new();
/// let sink = AuditSink::new().with_destination(memory.clone());
///
/// let record = AuditRecord::capture("start", &CallArgs::new().arg("Tesla"));
/// sink.record(&record).expect("memory destination accepts writes");
///
/// assert_eq!(memory.len(), 1);
/// assert!(memory.lines()[0].contains("call: start"));
/// ```
pub struct AuditSink {
    destinations: Vec<Box<dyn Destination>>,
}

impl AuditSink {
    /// Creates a sink with no destinations.
    pub fn new() -> Self {
        Self {
            destinations: Vec::new(),
        }
    }

    /// Adds a destination, returning the sink for chaining.
    pub fn with_destination(mut self, destination: impl Destination + 'static) -> Self {
        self.destinations.push(Box::new(destination));
        self
    }

    /// Returns the number of registered destinations.
    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }

    /// Writes an audit record to every destination.
    ///
    /// The line is stamped with the record's capture time and the
    /// [`AuditLevel::Info`] marker.
    ///
    /// # Errors
    ///
    /// Returns the first destination's [`SinkError`]; later destinations
    /// are not attempted, and no retry is made.
    pub fn record(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.emit(&format_line(
            record.timestamp(),
            AuditLevel::Info,
            &record.message(),
        ))
    }

    /// Writes a free-form message to every destination, stamped now.
    ///
    /// # Errors
    ///
    /// Same failure behavior as [`record`](Self::record).
    pub fn record_message(&self, level: AuditLevel, message: &str) -> Result<(), SinkError> {
        self.emit(&format_line(Local::now(), level, message))
    }

    fn emit(&self, line: &str) -> Result<(), SinkError> {
        for destination in &self.destinations {
            destination.append_line(line)?;
        }
        Ok(())
    }
}

impl Default for AuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditSink")
            .field("destinations", &self.destinations.len())
            .finish()
    }
}
