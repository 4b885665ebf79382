//! crates/fingers-crossed/src/sink/writer.rs
//! Text sink rendering records as `key=value` lines.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::UNIX_EPOCH;

use super::{Scope, Sink};
use crate::error::SinkError;
use crate::record::{Attr, Record};

const DEFAULT_TERMINATOR: &str = "\n";

/// Sink that renders records as `key=value` text lines into an [`io::Write`] target.
///
/// Each record becomes `LEVEL message key=value ...`, optionally prefixed with
/// the record timestamp, and ends with a terminator (`\n` unless replaced
/// through [`with_terminator`](Self::with_terminator)). Attributes added
/// through [`Sink::with_attrs`] come first, then the record's own attributes;
/// keys are qualified with the open group path (`group.key`). Derived sinks share the same writer, so output
/// from every view interleaves in emission order.
///
/// # Examples
///
/// ```
/// use fingers_crossed::{Attr, Level, Record, Sink, WriterSink};
///
/// let sink = WriterSink::new(Vec::<u8>::new());
/// let scoped = sink.with_attrs(&[Attr::new("job", "backup")]).with_group("io");
///
/// scoped.handle(&Record::new(Level::Warn, "slow write").with_attr("ms", 250_u32))?;
///
/// let output = sink.with_writer(|buffer| String::from_utf8(buffer.clone()).unwrap());
/// assert_eq!(output, "WARN slow write job=backup io.ms=250\n");
/// # Ok::<(), fingers_crossed::SinkError>(())
/// ```
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Arc<Mutex<W>>,
    scope: Scope,
    terminator: String,
    timestamps: bool,
}

impl<W> Clone for WriterSink<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            scope: self.scope.clone(),
            terminator: self.terminator.clone(),
            timestamps: self.timestamps,
        }
    }
}

impl<W> WriterSink<W> {
    /// Creates a sink that ends each rendered record with `\n`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            scope: Scope::default(),
            terminator: DEFAULT_TERMINATOR.to_owned(),
            timestamps: false,
        }
    }

    /// Replaces the string written after every record.
    ///
    /// An empty terminator is replaced by `\n`; records are always separated.
    #[must_use]
    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        let terminator = terminator.into();
        self.terminator = if terminator.is_empty() {
            DEFAULT_TERMINATOR.to_owned()
        } else {
            terminator
        };
        self
    }

    /// Enables or disables the `seconds.millis` timestamp prefix.
    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// The string written after every record.
    #[must_use]
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Runs `f` with exclusive access to the shared writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut writer)
    }

    fn render(&self, record: &Record) -> String {
        let mut line = String::new();
        if self.timestamps {
            let since_epoch = record
                .timestamp
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            line.push_str(&format!(
                "{}.{:03} ",
                since_epoch.as_secs(),
                since_epoch.subsec_millis()
            ));
        }
        line.push_str(record.level.as_str());
        line.push(' ');
        line.push_str(&record.message);
        for (key, value) in self.scope.resolve(record) {
            line.push(' ');
            line.push_str(&key);
            line.push('=');
            line.push_str(&value.to_string());
        }
        line.push_str(&self.terminator);
        line
    }
}

impl<W> Sink for WriterSink<W>
where
    W: Write + Send + 'static,
{
    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let line = self.render(record);
        self.with_writer(|writer| -> io::Result<()> {
            writer.write_all(line.as_bytes())?;
            writer.flush()
        })?;
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        Self {
            scope: self.scope.with_attrs(attrs),
            ..self.clone()
        }
    }

    fn with_group(&self, name: &str) -> Self {
        Self {
            scope: self.scope.with_group(name),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use std::time::Duration;

    fn output(sink: &WriterSink<Vec<u8>>) -> String {
        sink.with_writer(|buffer| String::from_utf8(buffer.clone()).expect("utf-8"))
    }

    #[test]
    fn sink_appends_newlines_by_default() {
        let sink = WriterSink::new(Vec::new());
        sink.handle(&Record::new(Level::Warn, "vanished"))
            .expect("write succeeds");
        sink.handle(&Record::new(Level::Error, "partial"))
            .expect("write succeeds");

        let output = output(&sink);
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("WARN vanished"));
        assert_eq!(lines.next(), Some("ERROR partial"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn custom_terminator_separates_released_records() {
        let sink = WriterSink::new(Vec::new()).with_terminator("\r\n");
        sink.handle(&Record::new(Level::Debug, "queued"))
            .expect("write succeeds");
        sink.handle(&Record::new(Level::Error, "failed"))
            .expect("write succeeds");

        assert_eq!(sink.terminator(), "\r\n");
        assert_eq!(output(&sink), "DEBUG queued\r\nERROR failed\r\n");
    }

    #[test]
    fn terminator_is_kept_by_derived_sinks() {
        let root = WriterSink::new(Vec::new()).with_terminator("\0");
        let child = root.with_group("job");

        child
            .handle(&Record::new(Level::Info, "one").with_attr("n", 1_u8))
            .expect("write succeeds");
        root.handle(&Record::new(Level::Info, "two"))
            .expect("write succeeds");

        assert_eq!(output(&root), "INFO one job.n=1\0INFO two\0");
    }

    #[test]
    fn empty_terminator_falls_back_to_newline() {
        let sink = WriterSink::new(Vec::new()).with_terminator("");
        sink.handle(&Record::new(Level::Warn, "a")).expect("write succeeds");
        sink.handle(&Record::new(Level::Warn, "b")).expect("write succeeds");

        assert_eq!(sink.terminator(), "\n");
        assert_eq!(output(&sink), "WARN a\nWARN b\n");
    }

    #[test]
    fn derived_sinks_share_the_writer() {
        let root = WriterSink::new(Vec::new());
        let child = root.with_attrs(&[Attr::new("whatever", "test")]);
        let grouped = root.with_group("testGroup");

        child
            .handle(&Record::new(Level::Info, "from child"))
            .expect("write succeeds");
        grouped
            .handle(&Record::new(Level::Error, "from group").with_attr("whatever", "test"))
            .expect("write succeeds");
        root.handle(&Record::new(Level::Debug, "from root"))
            .expect("write succeeds");

        assert_eq!(
            output(&root),
            "INFO from child whatever=test\n\
             ERROR from group testGroup.whatever=test\n\
             DEBUG from root\n"
        );
    }

    #[test]
    fn timestamps_render_seconds_and_millis() {
        let sink = WriterSink::new(Vec::new()).with_timestamps(true);
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_042);
        sink.handle(&Record::new(Level::Info, "tick").with_timestamp(at))
            .expect("write succeeds");

        assert_eq!(output(&sink), "1700000000.042 INFO tick\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_failure_surfaces_as_io_error() {
        let sink = WriterSink::new(BrokenPipe);
        let err = sink
            .handle(&Record::new(Level::Error, "lost"))
            .expect_err("writer is closed");

        match err {
            SinkError::Io(io) => assert_eq!(io.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
