//! Mirroring of live console output into the audit file.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::Local;

use crate::sink::{format_line, AuditLevel, Destination, FileDestination};
use crate::switch::AuditSwitch;

/// A writer that tees console output into the audit file.
///
/// Everything written goes to the primary stream unmodified and is
/// flushed immediately, so the console behaves exactly as before.
/// Complete non-blank lines are additionally appended to the file
/// destination as timestamped copies tagged `CONSOLE` — but only while
/// the shared switch is enabled — keeping the combined log attributable
/// line by line.
///
/// Partial lines are held back until their newline arrives; call
/// [`flush`](Write::flush) before dropping the mirror to push out any
/// trailing fragment. File-side failures surface as `io::Error` from the
/// write, never silently.
///
/// # Examples
///
/// ```no_run
/// use std::io::Write;
/// use std::sync::Arc;
/// use call_audit::sink::FileDestination;
/// use call_audit::{AuditSwitch, ConsoleMirror};
///
/// let file = Arc::new(FileDestination::in_log_dir("session")?);
/// let switch = AuditSwitch::default();
/// let mut out = ConsoleMirror::new(std::io::stdout(), file, switch);
///
/// writeln!(out, "engine started")?; // console + timestamped file copy
/// out.flush()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ConsoleMirror<W: Write> {
    primary: W,
    copy: Arc<FileDestination>,
    switch: AuditSwitch,
    pending: String,
}

impl<W: Write> ConsoleMirror<W> {
    /// Wraps `primary`, mirroring gated line copies into `copy`.
    pub fn new(primary: W, copy: Arc<FileDestination>, switch: AuditSwitch) -> Self {
        Self {
            primary,
            copy,
            switch,
            pending: String::new(),
        }
    }

    /// Unwraps the mirror, returning the primary stream.
    ///
    /// Any pending partial line is discarded; flush first to keep it.
    pub fn into_inner(self) -> W {
        self.primary
    }

    fn mirror_line(&self, line: &str) -> io::Result<()> {
        if self.switch.is_enabled() && !line.trim().is_empty() {
            self.copy
                .append_line(&format_line(Local::now(), AuditLevel::Console, line))
                .map_err(io::Error::other)?;
        }
        Ok(())
    }

    fn mirror_complete_lines(&mut self) -> io::Result<()> {
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            self.mirror_line(line.trim_end_matches(['\n', '\r']))?;
        }
        Ok(())
    }
}

impl<W: Write> Write for ConsoleMirror<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.primary.flush()?;
        self.pending.push_str(&String::from_utf8_lossy(buf));
        self.mirror_complete_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let remainder = std::mem::take(&mut self.pending);
            self.mirror_line(remainder.trim_end_matches(['\n', '\r']))?;
        }
        self.primary.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::parse_line;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn mirror_fixture(
        enabled: bool,
    ) -> (
        ConsoleMirror<SharedBuffer>,
        SharedBuffer,
        std::path::PathBuf,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mirror.log");
        let file = Arc::new(FileDestination::open(&path).expect("open"));
        let buffer = SharedBuffer::default();
        let mirror = ConsoleMirror::new(buffer.clone(), file, AuditSwitch::new(enabled));
        (mirror, buffer, path, dir)
    }

    fn file_lines(path: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn output_reaches_the_primary_unmodified() {
        let (mut mirror, buffer, _path, _dir) = mirror_fixture(true);

        writeln!(mirror, "engine started").expect("write");
        write!(mirror, "no newline yet").expect("write");

        assert_eq!(buffer.contents(), "engine started\nno newline yet");
    }

    #[test]
    fn complete_lines_are_mirrored_with_console_tag() {
        let (mut mirror, _buffer, path, _dir) = mirror_fixture(true);

        writeln!(mirror, "engine started").expect("write");

        let lines = file_lines(&path);
        assert_eq!(lines.len(), 1);
        let parsed = parse_line(&lines[0]).expect("mirrored line parses");
        assert_eq!(parsed.level, "CONSOLE");
        assert_eq!(parsed.message, "engine started");
    }

    #[test]
    fn blank_lines_are_not_mirrored() {
        let (mut mirror, buffer, path, _dir) = mirror_fixture(true);

        writeln!(mirror).expect("write");
        writeln!(mirror, "   ").expect("write");

        assert_eq!(buffer.contents(), "\n   \n");
        assert!(file_lines(&path).is_empty());
    }

    #[test]
    fn a_disabled_switch_stops_the_file_copy_only() {
        let (mut mirror, buffer, path, _dir) = mirror_fixture(false);

        writeln!(mirror, "still on the console").expect("write");

        assert_eq!(buffer.contents(), "still on the console\n");
        assert!(file_lines(&path).is_empty());
    }

    #[test]
    fn partial_lines_wait_for_their_newline() {
        let (mut mirror, _buffer, path, _dir) = mirror_fixture(true);

        write!(mirror, "part one, ").expect("write");
        assert!(file_lines(&path).is_empty());

        writeln!(mirror, "part two").expect("write");
        let lines = file_lines(&path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("part one, part two"));
    }

    #[test]
    fn flush_drains_a_trailing_fragment() {
        let (mut mirror, _buffer, path, _dir) = mirror_fixture(true);

        write!(mirror, "no newline").expect("write");
        mirror.flush().expect("flush");

        let lines = file_lines(&path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("no newline"));
    }

    #[test]
    fn toggling_mid_stream_takes_immediate_effect() {
        let (mut mirror, _buffer, path, _dir) = mirror_fixture(true);
        let switch = mirror.switch.clone();

        writeln!(mirror, "recorded").expect("write");
        switch.disable();
        writeln!(mirror, "not recorded").expect("write");
        switch.enable();
        writeln!(mirror, "recorded again").expect("write");

        let lines = file_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("recorded"));
        assert!(lines[1].ends_with("recorded again"));
    }

    #[test]
    fn into_inner_returns_the_primary() {
        let (mut mirror, buffer, _path, _dir) = mirror_fixture(true);
        writeln!(mirror, "line").expect("write");

        let inner = mirror.into_inner();
        assert_eq!(inner.contents(), buffer.contents());
    }
}
