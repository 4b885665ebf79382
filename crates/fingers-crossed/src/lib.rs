#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fingers_crossed` is a logging middleware that keeps low-severity records
//! out of the output while everything is healthy, and reveals all of them, in
//! their original order and with their original context, as soon as a record
//! reaches a configured threshold. Operators get the full story around a
//! failure without paying for verbose logging the rest of the time.
//!
//! # Design
//!
//! - [`Sink`] is the narrow contract for a downstream destination: emit a
//!   [`Record`], or derive a sink with extra attributes or an extra group.
//! - [`FingersCrossed`] decorates a sink. Below-threshold records are turned
//!   into deferred emissions and stored in a [`RecordBuffer`]; the first record
//!   at or above the threshold releases them and switches the handler to
//!   pass-through for good. [`FingersCrossed::flush_logs`] drains the buffer on
//!   demand without that permanent switch.
//! - Derived views (`with_attrs`, `with_group`) share the root's buffer and
//!   threshold but wrap their own derived sink. Each buffered record keeps the
//!   sink of the view it was submitted through, so its context survives a
//!   release triggered from any other view.
//! - [`WriterSink`] and [`MemorySink`] are ready-made sinks; with the
//!   `subscriber` feature, `FingersCrossedLayer` plugs a handler into
//!   `tracing-subscriber`.
//!
//! # Invariants
//!
//! - Every submitted record is either stored or emitted, exactly once.
//! - Released and flushed records are emitted in submission order.
//! - Once released, a handler never buffers again.
//! - A manual flush discards stored records below its minimum level; they are
//!   never emitted afterwards.
//!
//! # Errors
//!
//! Storing a record cannot fail. Emission failures are returned to whichever
//! call caused the emission. A release or flush keeps going after a failure and
//! reports every failure together as [`SinkError::Joined`].
//!
//! # Examples
//!
//! Hold back chatter until something fails:
//!
//! ```
//! use fingers_crossed::{Attr, FingersCrossed, Level, Record, Sink, WriterSink};
//!
//! let output = WriterSink::new(Vec::<u8>::new());
//! let handler = FingersCrossed::new(output.clone());
//! let request = handler.with_attrs(&[Attr::new("request", 42_u64)]);
//!
//! request.handle(&Record::new(Level::Debug, "parsing body"))?;
//! handler.handle(&Record::new(Level::Info, "cache miss"))?;
//! output.with_writer(|buffer| assert!(buffer.is_empty()));
//!
//! handler.handle(&Record::new(Level::Error, "upstream timed out"))?;
//! let text = output.with_writer(|buffer| String::from_utf8(buffer.clone()).unwrap());
//! assert_eq!(
//!     text,
//!     "DEBUG parsing body request=42\nINFO cache miss\nERROR upstream timed out\n"
//! );
//! # Ok::<(), fingers_crossed::SinkError>(())
//! ```
//!
//! Drain quiet records on demand, dropping the least severe:
//!
//! ```
//! use fingers_crossed::{FingersCrossed, Level, MemorySink, Record, Sink};
//!
//! let sink = MemorySink::new();
//! let handler = FingersCrossed::new(sink.clone());
//!
//! handler.handle(&Record::new(Level::Debug, "debug msg"))?;
//! handler.handle(&Record::new(Level::Info, "info msg"))?;
//! handler.handle(&Record::new(Level::Warn, "warn msg"))?;
//!
//! handler.flush_logs(Level::Info)?;
//! assert_eq!(sink.messages(), vec!["info msg", "warn msg"]);
//! # Ok::<(), fingers_crossed::SinkError>(())
//! ```

mod buffer;
mod config;
mod error;
mod handler;
mod level;
mod record;
mod sink;
#[cfg(feature = "subscriber")]
mod tracing_bridge;

pub use buffer::{Action, RecordBuffer};
pub use config::Config;
pub use error::{JoinedErrors, SinkError};
pub use handler::{FingersCrossed, FingersCrossedBuilder};
pub use level::{Level, ParseLevelError};
pub use record::{Attr, Record, Value};
pub use sink::{CapturedRecord, MemorySink, Sink, WriterSink};
#[cfg(feature = "subscriber")]
pub use tracing_bridge::{FingersCrossedLayer, init_tracing};
