//! The live console destination.

use std::io::Write;
use std::sync::Mutex;

use super::{Destination, SinkError, SinkErrorKind};

/// A destination that writes audit lines to a live console stream.
///
/// Defaults to standard error so audit lines stay separable from a
/// program's primary standard-output content. Any `Write + Send`
/// implementation can be injected instead, which is how tests observe
/// console output.
///
/// # Examples
///
/// ```
/// use call_audit::sink::{AuditSink, ConsoleDestination};
///
/// let sink = AuditSink::new().with_destination(ConsoleDestination::stderr());
/// ```
pub struct ConsoleDestination {
    stream: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleDestination {
    /// A console destination writing to standard error.
    pub fn stderr() -> Self {
        Self::with_writer(std::io::stderr())
    }

    /// A console destination writing to the given stream.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            stream: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for ConsoleDestination {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Destination for ConsoleDestination {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| SinkError::new(SinkErrorKind::Poisoned))?;
        writeln!(stream, "{}", line)?;
        stream.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleDestination").finish_non_exhaustive()
    }
}
