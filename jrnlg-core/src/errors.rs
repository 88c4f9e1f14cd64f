//! Error types for the journal engine.
//!
//! Parsing failures live in [`ParseError`]; everything that touches the disk or spans many
//! files is a [`StoreError`].

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Why an entry's markdown could not be turned into a `JournalEntry`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing header: expected line starting with '##'")]
    MissingHeader,
    #[error(
        "invalid timestamp format: expected '## Weekday YYYY-MM-DD H:MM AM/PM Location', got: {0}"
    )]
    InvalidTimestampFormat(String),
    #[error("invalid meridiem: expected AM or PM, got: {0}")]
    InvalidMeridiem(String),
    #[error("invalid date format: expected YYYY-MM-DD, got: {0}")]
    InvalidDateFormat(String),
    #[error("invalid year: {0}")]
    InvalidYear(String),
    #[error("invalid month: {0}")]
    InvalidMonth(String),
    #[error("invalid day: {0}")]
    InvalidDay(String),
    #[error("invalid date: {0} does not exist")]
    InvalidDate(String),
    #[error("invalid time format: expected H:MM or HH:MM, got: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid hour: must be between 1 and 12, got: {0}")]
    InvalidHour(String),
    #[error("invalid minute: must be between 0 and 59, got: {0}")]
    InvalidMinute(String),
    #[error("unknown location: {0}")]
    UnknownLocation(String),
    #[error("nonexistent local time: {0} is skipped in {1}")]
    NonexistentLocalTime(String, String),
    #[error("weekday mismatch: expected {expected}, got {got} for date {date}")]
    WeekdayMismatch {
        expected: String,
        got: String,
        date: String,
    },
    #[error("empty body: entry must contain body text")]
    EmptyBody,
    #[error("tag exceeds maximum length of {max} characters: {tag}")]
    TagTooLong { tag: String, max: usize },
    #[error("mention exceeds maximum length of {max} characters: {mention}")]
    MentionTooLong { mention: String, max: usize },
}

/// Failures of the file store and the operations layered on it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("too many entries with same timestamp: {0}")]
    CollisionExhausted(String),
    #[error("{}", describe_partial(.succeeded, .failures))]
    PartialFailure {
        succeeded: Vec<PathBuf>,
        failures: Vec<StoreError>,
    },
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("invalid {kind} `{name}`: {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },
    #[error("index unavailable: {0}")]
    IndexUnavailable(#[source] Arc<StoreError>),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            action,
            source,
        }
    }

    /// Paths that were changed before a batch operation gave up. Empty for every other error.
    pub fn succeeded(&self) -> &[PathBuf] {
        match self {
            StoreError::PartialFailure { succeeded, .. } => succeeded,
            _ => &[],
        }
    }
}

fn describe_partial(succeeded: &[PathBuf], failures: &[StoreError]) -> String {
    let total = succeeded.len() + failures.len();
    let details = failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} of {total} operations failed: {details}", failures.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_keeps_successes_and_reports_every_failure() {
        let err = StoreError::PartialFailure {
            succeeded: vec![PathBuf::from("/j/2026/02/a.md")],
            failures: vec![
                StoreError::NotFound("/j/2026/02/b.md".to_string()),
                StoreError::NotFound("/j/2026/02/c.md".to_string()),
            ],
        };
        assert_eq!(err.succeeded(), &[PathBuf::from("/j/2026/02/a.md")]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 of 3 operations failed"));
        assert!(msg.contains("b.md"));
        assert!(msg.contains("c.md"));
    }

    #[test]
    fn parse_error_is_wrapped_with_its_path() {
        let err = StoreError::Parse {
            path: PathBuf::from("/j/x.md"),
            source: ParseError::EmptyBody,
        };
        assert_eq!(
            err.to_string(),
            "failed to parse /j/x.md: empty body: entry must contain body text"
        );
        assert!(StoreError::NotFound("x".into()).succeeded().is_empty());
    }
}
