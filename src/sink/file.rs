//! The append-only file destination.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Destination, SinkError, SinkErrorKind};

/// A destination that appends audit lines to a file.
///
/// The file is opened once in append mode and owned exclusively by the
/// destination; the parent directory is created on open if missing, which
/// is the only filesystem side effect this component owns. Every line is
/// written and flushed before [`append_line`](Destination::append_line)
/// returns, so the log remains reliable evidence of what ran even if the
/// process crashes immediately after. The handle is flushed and closed
/// when the destination is dropped.
///
/// The handle is mutex-guarded so the write-and-flush sequence stays
/// atomic under concurrent callers.
///
/// # Examples
///
/// ```no_run
/// use call_audit::sink::{AuditSink, FileDestination};
///
/// let file = FileDestination::in_log_dir("method_calls")?;
/// let sink = AuditSink::new().with_destination(file);
/// # Ok::<(), call_audit::sink::SinkError>(())
/// ```
pub struct FileDestination {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileDestination {
    /// Opens (or creates) the file at `path` for appending.
    ///
    /// Missing parent directories are created first; repeating the call
    /// against an existing directory and file is harmless and appends.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] of kind `Io` if the directory cannot be
    /// created or the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Opens `log/<name>.log`, resolved against the working directory.
    ///
    /// This is the conventional location for per-program audit files: one
    /// `log` directory beside the program, one file per program variant.
    ///
    /// # Errors
    ///
    /// Same failure behavior as [`open`](Self::open).
    pub fn in_log_dir(name: &str) -> Result<Self, SinkError> {
        Self::open(Path::new("log").join(format!("{}.log", name)))
    }

    /// The path this destination appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Destination for FileDestination {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| SinkError::new(SinkErrorKind::Poisoned))?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for FileDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDestination")
            .field("path", &self.path)
            .finish()
    }
}
