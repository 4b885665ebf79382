//! crates/fingers-crossed/src/handler.rs
//! Threshold handler deciding per record between buffering and emission.

use std::sync::Arc;

use crate::buffer::RecordBuffer;
use crate::config::Config;
use crate::error::SinkError;
use crate::level::Level;
use crate::record::{Attr, Record};
use crate::sink::Sink;

/// Sink decorator that stays quiet until something goes wrong.
///
/// Records below the threshold are held back in a [`RecordBuffer`] shared by
/// this handler and every view derived from it through
/// [`with_attrs`](Sink::with_attrs) or [`with_group`](Sink::with_group). The
/// first record at or above the threshold, arriving through any view, releases
/// the whole backlog in submission order, each record through the sink of the
/// view it was submitted on, and from then on every record passes straight
/// through.
///
/// # Examples
///
/// ```
/// use fingers_crossed::{FingersCrossed, Level, MemorySink, Record, Sink};
///
/// let sink = MemorySink::new();
/// let handler = FingersCrossed::new(sink.clone());
///
/// handler.handle(&Record::new(Level::Debug, "debug msg"))?;
/// handler.handle(&Record::new(Level::Info, "info msg"))?;
/// assert!(sink.is_empty());
///
/// handler.handle(&Record::new(Level::Error, "error msg"))?;
/// handler.handle(&Record::new(Level::Warn, "warn msg"))?;
/// assert_eq!(
///     sink.messages(),
///     vec!["debug msg", "info msg", "error msg", "warn msg"]
/// );
/// # Ok::<(), fingers_crossed::SinkError>(())
/// ```
#[derive(Debug)]
pub struct FingersCrossed<S> {
    threshold: Level,
    sink: Arc<S>,
    buffer: Arc<RecordBuffer>,
}

impl<S> Clone for FingersCrossed<S> {
    fn clone(&self) -> Self {
        Self {
            threshold: self.threshold,
            sink: Arc::clone(&self.sink),
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<S: Sink> FingersCrossed<S> {
    /// Wraps `sink` with the default threshold of [`Level::Error`].
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, Config::default())
    }

    /// Wraps `sink` using the supplied configuration.
    #[must_use]
    pub fn with_config(sink: S, config: Config) -> Self {
        Self {
            threshold: config.threshold,
            sink: Arc::new(sink),
            buffer: Arc::new(RecordBuffer::new()),
        }
    }

    /// Starts a builder around `sink`.
    pub fn builder(sink: S) -> FingersCrossedBuilder<S> {
        FingersCrossedBuilder {
            sink,
            config: Config::default(),
        }
    }

    /// Level at or above which the buffer is released.
    #[must_use]
    pub const fn threshold(&self) -> Level {
        self.threshold
    }

    /// The sink this view emits through.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The buffer shared by every view of the same root handler.
    #[must_use]
    pub fn buffer(&self) -> &RecordBuffer {
        &self.buffer
    }

    /// Reports whether a threshold crossing has switched the handler to
    /// pass-through.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.buffer.is_released()
    }

    /// Emits the buffered records at or above `min_level` and drops the rest.
    ///
    /// The handler keeps buffering afterwards; only a threshold crossing stops
    /// buffering for good. After that this call has nothing left to do.
    pub fn flush_logs(&self, min_level: Level) -> Result<(), SinkError> {
        self.buffer.flush(min_level)
    }

    fn derive(&self, sink: S) -> Self {
        Self {
            threshold: self.threshold,
            sink: Arc::new(sink),
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<S: Sink> Sink for FingersCrossed<S> {
    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        if record.level >= self.threshold {
            let released = if self.buffer.is_released() {
                Ok(())
            } else {
                self.buffer.release()
            };
            let current = self.sink.handle(record);
            return SinkError::join(released.err().into_iter().chain(current.err()));
        }

        // Capture this view's sink now: the record must be replayed with the
        // context it was submitted under, whichever view triggers the release.
        let sink = Arc::clone(&self.sink);
        let level = record.level;
        let record = record.clone();
        self.buffer
            .append(level, Box::new(move || sink.handle(&record)))
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        self.derive(self.sink.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        self.derive(self.sink.with_group(name))
    }

    /// Every level is accepted so that quiet records can be revealed later.
    fn enabled(&self, _level: Level) -> bool {
        true
    }
}

/// Fluent constructor for [`FingersCrossed`].
///
/// ```
/// use fingers_crossed::{FingersCrossed, Level, MemorySink};
///
/// let handler = FingersCrossed::builder(MemorySink::new())
///     .threshold(Level::Warn)
///     .build();
/// assert_eq!(handler.threshold(), Level::Warn);
/// ```
#[derive(Debug)]
#[must_use = "call build() to obtain the handler"]
pub struct FingersCrossedBuilder<S> {
    sink: S,
    config: Config,
}

impl<S: Sink> FingersCrossedBuilder<S> {
    /// Sets the level at which buffered records are released.
    pub fn threshold(mut self, level: Level) -> Self {
        self.config.threshold = level;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Builds the root handler with a fresh buffer.
    #[must_use]
    pub fn build(self) -> FingersCrossed<S> {
        FingersCrossed::with_config(self.sink, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn handler() -> (MemorySink, FingersCrossed<MemorySink>) {
        let sink = MemorySink::new();
        (sink.clone(), FingersCrossed::new(sink))
    }

    #[test]
    fn default_threshold_is_error() {
        let (_, handler) = handler();
        assert_eq!(handler.threshold(), Level::Error);
    }

    #[test]
    fn handler_accepts_every_level() {
        let (_, handler) = handler();
        assert!(Level::ALL.iter().all(|&level| handler.enabled(level)));
    }

    #[test]
    fn below_threshold_records_stay_buffered() {
        let (sink, handler) = handler();
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn] {
            handler
                .handle(&Record::new(level, level.as_str()))
                .expect("buffering never fails");
        }

        assert!(sink.is_empty());
        assert_eq!(handler.buffer().len(), 4);
        assert!(!handler.is_released());
    }

    #[test]
    fn threshold_record_releases_backlog_then_itself() {
        let (sink, handler) = handler();
        handler.handle(&Record::new(Level::Debug, "debug")).expect("buffered");
        handler.handle(&Record::new(Level::Info, "info")).expect("buffered");
        handler.handle(&Record::new(Level::Error, "error")).expect("emitted");
        handler.handle(&Record::new(Level::Warn, "warn")).expect("emitted");

        assert_eq!(sink.messages(), vec!["debug", "info", "error", "warn"]);
        assert!(handler.is_released());
        assert!(handler.buffer().is_empty());
    }

    #[test]
    fn builder_threshold_is_shared_by_derived_views() {
        let sink = MemorySink::new();
        let handler = FingersCrossed::builder(sink.clone())
            .threshold(Level::Warn)
            .build();
        let child = handler.with_group("child");

        assert_eq!(child.threshold(), Level::Warn);
        child.handle(&Record::new(Level::Info, "quiet")).expect("buffered");
        assert!(sink.is_empty());
        child.handle(&Record::new(Level::Warn, "loud")).expect("emitted");
        assert_eq!(sink.messages(), vec!["quiet", "loud"]);
    }

    #[test]
    fn empty_derivations_reuse_the_same_sink() {
        let (_, handler) = handler();
        let same = handler.with_attrs(&[]).with_group("");
        assert!(Arc::ptr_eq(&handler.sink, &same.sink));
        assert!(Arc::ptr_eq(&handler.buffer, &same.buffer));
    }

    #[test]
    fn derived_views_share_one_buffer() {
        let (_, handler) = handler();
        let child = handler.with_attrs(&[Attr::new("k", "v")]);
        assert!(Arc::ptr_eq(&handler.buffer, &child.buffer));
        assert!(!Arc::ptr_eq(&handler.sink, &child.sink));
    }
}
