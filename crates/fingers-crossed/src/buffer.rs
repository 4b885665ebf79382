//! crates/fingers-crossed/src/buffer.rs
//! Ordered holding area for deferred emissions.
//!
//! The buffer stores one boxed closure per suppressed record together with the
//! record's [`Level`]. It has two draining operations:
//!
//! - [`RecordBuffer::release`] runs every stored closure in insertion order and
//!   flips the buffer into pass-through mode for good.
//! - [`RecordBuffer::flush`] runs the closures at or above a minimum level,
//!   discards the rest, and leaves the buffer accepting new entries.
//!
//! Both drains and [`RecordBuffer::append`] take the same mutex, so a record
//! can never be appended after a release has started draining, and a flush
//! cannot race a release into emitting an entry twice.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::SinkError;
use crate::level::Level;

/// Deferred emission of one suppressed record.
pub type Action = Box<dyn FnOnce() -> Result<(), SinkError> + Send + 'static>;

struct Entry {
    level: Level,
    action: Action,
}

/// Thread-safe, insertion-ordered buffer of deferred emissions.
///
/// A single buffer is shared by a root [`FingersCrossed`](crate::FingersCrossed)
/// handler and every view derived from it.
#[derive(Default)]
pub struct RecordBuffer {
    entries: Mutex<Vec<Entry>>,
    // Written only while `entries` is locked; read lock-free as a fast path.
    released: AtomicBool,
}

impl RecordBuffer {
    /// Creates an empty buffer in buffering mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        // Entries are moved out of the guard before any action runs, so a sink
        // that panicked cannot leave the list half-drained.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reports whether [`release`](Self::release) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether no entries are currently held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stores `action`, or runs it immediately once the buffer is released.
    ///
    /// Storing never fails. When the buffer has been released the action's own
    /// result is returned.
    pub fn append(&self, level: Level, action: Action) -> Result<(), SinkError> {
        if self.is_released() {
            return action();
        }

        let mut entries = self.lock();
        if self.released.load(Ordering::Acquire) {
            // Lost the race with a release: emit while still holding the lock
            // so this record lands after everything the release drained.
            return action();
        }
        entries.push(Entry { level, action });
        if entries.len() == 1 {
            drop(entries);
            tracing::trace!(target: "fingers_crossed::buffer", "first entry buffered");
        }
        Ok(())
    }

    /// Switches the buffer to pass-through and emits every stored entry.
    ///
    /// Entries run in insertion order regardless of level. Every failure is
    /// collected; one failing entry does not stop the others. Calling this on a
    /// released or empty buffer emits nothing and returns `Ok(())`.
    pub fn release(&self) -> Result<(), SinkError> {
        let mut entries = self.lock();
        let drained = std::mem::take(&mut *entries);
        let count = drained.len();

        let errors: Vec<SinkError> = drained
            .into_iter()
            .filter_map(|entry| (entry.action)().err())
            .collect();
        // Set only once the backlog is out: lock-free readers must not start
        // passing records through while older entries are still draining.
        let first_release = !self.released.swap(true, Ordering::AcqRel);
        drop(entries);

        if first_release {
            tracing::debug!(
                target: "fingers_crossed::buffer",
                emitted = count,
                failed = errors.len(),
                "buffer released"
            );
        }
        SinkError::join(errors)
    }

    /// Emits the stored entries at or above `min_level` and empties the buffer.
    ///
    /// Entries below `min_level` are dropped without being emitted; they are
    /// not kept for a later flush. The released state is left untouched.
    pub fn flush(&self, min_level: Level) -> Result<(), SinkError> {
        let mut entries = self.lock();
        let drained = std::mem::take(&mut *entries);
        if drained.is_empty() {
            return Ok(());
        }

        let mut emitted = 0_usize;
        let mut discarded = 0_usize;
        let mut errors = Vec::new();
        for entry in drained {
            if entry.level >= min_level {
                emitted += 1;
                if let Err(error) = (entry.action)() {
                    errors.push(error);
                }
            } else {
                discarded += 1;
            }
        }
        drop(entries);

        tracing::debug!(
            target: "fingers_crossed::buffer",
            %min_level,
            emitted,
            discarded,
            failed = errors.len(),
            "buffer flushed"
        );
        SinkError::join(errors)
    }
}

impl fmt::Debug for RecordBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBuffer")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
