//! crates/fingers-crossed/src/sink/memory.rs
//! In-memory sink capturing emitted records.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Scope, Sink};
use crate::error::SinkError;
use crate::level::Level;
use crate::record::{Attr, Record, Value};

/// A record as observed by a [`MemorySink`], with its context resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedRecord {
    /// Record severity.
    pub level: Level,
    /// Record message.
    pub message: String,
    /// Baked-in and record attributes, keys qualified with the group path.
    pub attrs: Vec<(String, Value)>,
}

impl CapturedRecord {
    /// Looks up an attribute by its qualified key (`group.key`).
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs
            .iter()
            .find_map(|(k, value)| (k == key).then_some(value))
    }
}

/// Sink that keeps every emitted record in memory.
///
/// All sinks derived from one `MemorySink` append to the same storage, so the
/// captured order is the global emission order across views.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
    scope: Scope,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CapturedRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of everything captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.lock().clone()
    }

    /// Returns the captured messages in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Number of captured records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Sink for MemorySink {
    fn handle(&self, record: &Record) -> Result<(), SinkError> {
        let captured = CapturedRecord {
            level: record.level,
            message: record.message.clone(),
            attrs: self.scope.resolve(record),
        };
        self.lock().push(captured);
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        Self {
            records: Arc::clone(&self.records),
            scope: self.scope.with_attrs(attrs),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        Self {
            records: Arc::clone(&self.records),
            scope: self.scope.with_group(name),
        }
    }
}
