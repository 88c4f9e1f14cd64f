use super::parse_entries::{extract_mentions, extract_tags};
use crate::errors::ParseError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;

/// A point in time together with the IANA zone it was written in.
pub type Timestamp = DateTime<Tz>;

/// One journal record. Maps to exactly one markdown file on disk.
///
/// Tags and mentions are always derived from the body; there is no way to set them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    timestamp: Timestamp,
    tags: Vec<String>,
    mentions: Vec<String>,
    body: String,
}

impl JournalEntry {
    /// Builds an entry from a timestamp and raw body text.
    ///
    /// The body is trimmed; tags and mentions are extracted from it.
    pub fn new(timestamp: Timestamp, body: impl AsRef<str>) -> Result<Self, ParseError> {
        let body = body.as_ref().trim();
        if body.is_empty() {
            return Err(ParseError::EmptyBody);
        }
        let tags = extract_tags(body)?;
        let mentions = extract_mentions(body)?;
        Ok(Self {
            timestamp,
            tags,
            mentions,
            body: body.to_string(),
        })
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Sorted, deduplicated, lowercase.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Sorted, deduplicated, lowercase.
    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Index projection of an entry: everything but the body.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub path: PathBuf,
    pub timestamp: Timestamp,
    pub tags: Vec<String>,
    pub mentions: Vec<String>,
}

impl IndexedEntry {
    pub fn from_entry(path: PathBuf, entry: &JournalEntry) -> Self {
        Self {
            path,
            timestamp: entry.timestamp,
            tags: entry.tags.clone(),
            mentions: entry.mentions.clone(),
        }
    }
}

/// Date bounds and pagination for listings and searches.
///
/// Both bounds are inclusive; `None` means unbounded on that side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl EntryFilter {
    pub fn between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            start,
            end,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The same date bounds with pagination removed.
    pub fn unpaginated(&self) -> Self {
        Self::between(self.start, self.end)
    }

    pub fn matches(&self, timestamp: &Timestamp) -> bool {
        let instant = timestamp.with_timezone(&Utc);
        if let Some(start) = self.start {
            if instant < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if instant > end {
                return false;
            }
        }
        true
    }

    /// Applies `offset` then `limit`. An offset past the end yields an empty list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let take = self.limit.unwrap_or(usize::MAX);
        items.into_iter().skip(self.offset).take(take).collect()
    }
}
