//! crates/fingers-crossed/src/tracing_bridge.rs
//! Bridge between the tracing crate and a fingers-crossed handler.
//!
//! [`FingersCrossedLayer`] is a tracing-subscriber layer that converts every
//! event into a [`Record`] and submits it to a [`FingersCrossed`] handler, so
//! the standard `trace!`..`error!` macros get fingers-crossed behaviour.
//!
//! # Mapping
//!
//! - The event level maps onto [`Level`] one to one.
//! - The `message` field becomes the record message; every other field becomes
//!   an attribute, preceded by a `target` attribute naming the event target.
//! - Each span in the event's scope, outermost first, opens a group named
//!   after the span, so span nesting shows up as group context.
//!
//! Events emitted by this crate itself are ignored.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fingers_crossed::{init_tracing, FingersCrossed, WriterSink};
//!
//! let handler = FingersCrossed::new(WriterSink::new(std::io::stderr()));
//! init_tracing(handler.clone());
//!
//! tracing::debug!(attempt = 1, "connecting");   // held back
//! tracing::error!("connection refused");        // reveals the debug line too
//! ```

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::error::SinkError;
use crate::handler::FingersCrossed;
use crate::level::Level;
use crate::record::{Attr, Record, Value};
use crate::sink::Sink;

const OWN_TARGET: &str = "fingers_crossed";

type ErrorHook = Box<dyn Fn(SinkError) + Send + Sync + 'static>;

/// A tracing layer feeding events into a [`FingersCrossed`] handler.
///
/// `Layer::on_event` cannot return errors, so submission failures are passed
/// to an error hook. The default hook writes them to standard error.
pub struct FingersCrossedLayer<S> {
    handler: FingersCrossed<S>,
    on_error: ErrorHook,
}

impl<S: Sink> FingersCrossedLayer<S> {
    /// Creates a layer submitting to `handler`.
    #[must_use]
    pub fn new(handler: FingersCrossed<S>) -> Self {
        Self {
            handler,
            on_error: Box::new(|error| {
                eprintln!("fingers-crossed: failed to emit log record: {error}");
            }),
        }
    }

    /// Replaces the hook that receives submission failures.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(SinkError) + Send + Sync + 'static,
    {
        self.on_error = Box::new(hook);
        self
    }

    /// The wrapped handler, for example to call
    /// [`flush_logs`](FingersCrossed::flush_logs).
    #[must_use]
    pub const fn handler(&self) -> &FingersCrossed<S> {
        &self.handler
    }

    fn is_own_event(target: &str) -> bool {
        target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    }
}

impl<S> fmt::Debug for FingersCrossedLayer<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingersCrossedLayer")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

impl<S, R> Layer<R> for FingersCrossedLayer<S>
where
    S: Sink,
    R: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, R>) {
        let metadata = event.metadata();
        if Self::is_own_event(metadata.target()) {
            return;
        }

        let mut visitor = RecordVisitor::new(Level::from(metadata.level()));
        visitor
            .record
            .attrs
            .push(Attr::new("target", metadata.target()));
        event.record(&mut visitor);

        let result = match ctx.event_scope(event) {
            Some(scope) => {
                let mut view = self.handler.clone();
                for span in scope.from_root() {
                    view = view.with_group(span.name());
                }
                view.handle(&visitor.record)
            }
            None => self.handler.handle(&visitor.record),
        };

        if let Err(error) = result {
            (self.on_error)(error);
        }
    }
}

/// Collects event fields into a [`Record`].
struct RecordVisitor {
    record: Record,
}

impl RecordVisitor {
    fn new(level: Level) -> Self {
        Self {
            record: Record::new(level, String::new()),
        }
    }

    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.record.message = value.to_string();
        } else {
            self.record.attrs.push(Attr::new(field.name(), value));
        }
    }
}

impl Visit for RecordVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.record.message = format!("{value:?}");
        } else {
            self.push(field, Value::Str(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.record.message = value.to_owned();
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::U64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }
}

/// Installs a [`FingersCrossedLayer`] around `handler` as the global default
/// subscriber.
///
/// # Panics
///
/// Panics if a global default subscriber has already been set.
pub fn init_tracing<S: Sink>(handler: FingersCrossed<S>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(FingersCrossedLayer::new(handler))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_targets_are_recognised() {
        type L = FingersCrossedLayer<crate::MemorySink>;
        assert!(L::is_own_event("fingers_crossed"));
        assert!(L::is_own_event("fingers_crossed::buffer"));
        assert!(!L::is_own_event("fingers_crossed_demo"));
        assert!(!L::is_own_event("app::worker"));
    }
}
