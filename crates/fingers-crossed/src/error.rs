//! crates/fingers-crossed/src/error.rs
//! Sink failures and the aggregate reported by release and flush passes.

use std::fmt;
use std::io;

/// Failure reported by a [`Sink`](crate::Sink) or by a handler operation that
/// emitted several records.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The underlying writer failed.
    #[error("sink write failed: {0}")]
    Io(#[from] io::Error),

    /// The sink refused the record.
    #[error("sink rejected record: {0}")]
    Rejected(String),

    /// Any other sink-specific failure.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Several emissions failed during one release, flush, or threshold crossing.
    #[error(transparent)]
    Joined(#[from] JoinedErrors),
}

impl SinkError {
    /// Wraps an arbitrary error as [`SinkError::Other`].
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Other(error.into())
    }

    /// Returns every leaf failure carried by this error.
    ///
    /// A [`SinkError::Joined`] yields its members; every other variant yields
    /// itself.
    pub fn causes(&self) -> Vec<&Self> {
        match self {
            Self::Joined(joined) => joined.iter().collect(),
            other => vec![other],
        }
    }

    /// Joins the failures produced by one pass over the buffer.
    ///
    /// Returns `Ok(())` when the iterator is empty and the error unchanged when
    /// it yields exactly one. Nested [`SinkError::Joined`] values are flattened
    /// so every cause sits at the top level.
    pub fn join<I>(errors: I) -> Result<(), Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        for error in errors {
            match error {
                Self::Joined(joined) => flat.extend(joined.errors),
                other => flat.push(other),
            }
        }

        match flat.len() {
            0 => Ok(()),
            1 => Err(flat.remove(0)),
            _ => Err(Self::Joined(JoinedErrors { errors: flat })),
        }
    }
}

/// Aggregate of the sink failures encountered in a single pass.
///
/// Every failure is preserved in emission order. The display form lists the
/// individual messages one per line.
#[derive(Debug)]
pub struct JoinedErrors {
    errors: Vec<SinkError>,
}

impl JoinedErrors {
    /// Number of failures in the aggregate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Reports whether the aggregate is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the failures in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, SinkError> {
        self.errors.iter()
    }

    /// Consumes the aggregate and returns the failures.
    #[must_use]
    pub fn into_vec(self) -> Vec<SinkError> {
        self.errors
    }
}

impl fmt::Display for JoinedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for JoinedErrors {}

impl IntoIterator for JoinedErrors {
    type Item = SinkError;
    type IntoIter = std::vec::IntoIter<SinkError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a JoinedErrors {
    type Item = &'a SinkError;
    type IntoIter = std::slice::Iter<'a, SinkError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(message: &str) -> SinkError {
        SinkError::Rejected(message.to_owned())
    }

    #[test]
    fn join_of_nothing_is_ok() {
        assert!(SinkError::join(Vec::new()).is_ok());
    }

    #[test]
    fn join_of_one_error_returns_it_unchanged() {
        let err = SinkError::join([rejected("only")]).expect_err("one failure");
        assert!(matches!(err, SinkError::Rejected(ref m) if m == "only"));
    }

    #[test]
    fn join_keeps_every_cause_in_order() {
        let err = SinkError::join([rejected("first"), rejected("second"), rejected("third")])
            .expect_err("three failures");

        let SinkError::Joined(joined) = err else {
            panic!("expected joined error, got {err:?}");
        };
        assert_eq!(joined.len(), 3);
        let messages: Vec<String> = joined.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "sink rejected record: first",
                "sink rejected record: second",
                "sink rejected record: third",
            ]
        );
    }

    #[test]
    fn join_flattens_nested_aggregates() {
        let inner = SinkError::join([rejected("a"), rejected("b")]).expect_err("two failures");
        let err = SinkError::join([inner, rejected("c")]).expect_err("three failures");

        assert_eq!(err.causes().len(), 3);
    }

    #[test]
    fn joined_display_lists_one_cause_per_line() {
        let err = SinkError::join([
            rejected("first"),
            SinkError::from(io::Error::other("disk full")),
        ])
        .expect_err("two failures");

        assert_eq!(
            err.to_string(),
            "sink rejected record: first\nsink write failed: disk full"
        );
    }

    #[test]
    fn causes_of_leaf_error_is_itself() {
        let err = SinkError::other("boom");
        let causes = err.causes();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].to_string(), "boom");
    }

    #[test]
    fn owned_iteration_recovers_underlying_io_error() {
        let err = SinkError::join([
            SinkError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe")),
            rejected("nope"),
        ])
        .expect_err("two failures");

        let SinkError::Joined(joined) = err else {
            panic!("expected joined error");
        };
        let kinds: Vec<Option<io::ErrorKind>> = joined
            .into_iter()
            .map(|e| match e {
                SinkError::Io(io) => Some(io.kind()),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![Some(io::ErrorKind::BrokenPipe), None]);
    }
}
