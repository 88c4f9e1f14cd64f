//! Renaming a tag or mention across every entry that carries it.

use super::file_store::FileStore;
use super::format_utils::format_entry;
use super::parse_entries::{MAX_MENTION_LENGTH, MAX_TAG_LENGTH, parse_entry};
use crate::errors::{StoreError, StoreResult};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use strum_macros::{AsRefStr, Display, EnumString};

static TAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("valid tag name regex"));
static MENTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid mention name regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MetadataKind {
    Tag,
    Mention,
}

impl MetadataKind {
    pub fn symbol(self) -> char {
        match self {
            MetadataKind::Tag => '#',
            MetadataKind::Mention => '@',
        }
    }

    fn max_len(self) -> usize {
        match self {
            MetadataKind::Tag => MAX_TAG_LENGTH,
            MetadataKind::Mention => MAX_MENTION_LENGTH,
        }
    }

    /// Checks that `name` (without the symbol) is something the parser would extract whole.
    pub fn validate(self, name: &str) -> StoreResult<()> {
        let invalid = |reason| StoreError::InvalidName {
            kind: self.into(),
            name: name.to_string(),
            reason,
        };
        if name.is_empty() {
            return Err(invalid("cannot be empty"));
        }
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("must start with a letter"));
        }
        let pattern = match self {
            MetadataKind::Tag => &*TAG_NAME,
            MetadataKind::Mention => &*MENTION_NAME,
        };
        if !pattern.is_match(name) {
            return Err(invalid(match self {
                MetadataKind::Tag => "can only contain letters, numbers, underscores, and hyphens",
                MetadataKind::Mention => "can only contain letters, numbers, and underscores",
            }));
        }
        if name.chars().count() > self.max_len() {
            return Err(invalid("exceeds maximum length of 80 characters"));
        }
        Ok(())
    }
}

impl From<MetadataKind> for &'static str {
    fn from(kind: MetadataKind) -> Self {
        match kind {
            MetadataKind::Tag => "tag",
            MetadataKind::Mention => "mention",
        }
    }
}

/// Rewrites `#old`/`@old` to the new name in entry bodies.
pub struct MetadataRenamer<'a> {
    store: &'a FileStore,
}

impl<'a> MetadataRenamer<'a> {
    pub fn new(store: &'a FileStore) -> Self {
        Self { store }
    }

    pub fn replace_tag_in_entries(
        &self,
        old: &str,
        new: &str,
        dry_run: bool,
    ) -> StoreResult<Vec<PathBuf>> {
        self.replace(MetadataKind::Tag, old, new, dry_run)
    }

    pub fn replace_mention_in_entries(
        &self,
        old: &str,
        new: &str,
        dry_run: bool,
    ) -> StoreResult<Vec<PathBuf>> {
        self.replace(MetadataKind::Mention, old, new, dry_run)
    }

    /// Files the index lists under `old`, oldest first.
    pub fn candidates(&self, kind: MetadataKind, name: &str) -> StoreResult<Vec<PathBuf>> {
        let index = self.store.index()?;
        let bucket = match kind {
            MetadataKind::Tag => index.entries_for_tag(name),
            MetadataKind::Mention => index.entries_for_mention(name),
        };
        let mut handles = bucket.to_vec();
        handles.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
        Ok(handles.into_iter().map(|h| h.path.clone()).collect())
    }

    /// Renames `old` to `new` in every candidate entry and returns the paths that changed.
    ///
    /// With `dry_run` nothing is written; the returned paths are those that would change.
    /// If any entry fails, the result is a [`StoreError::PartialFailure`] listing the rest.
    pub fn replace(
        &self,
        kind: MetadataKind,
        old: &str,
        new: &str,
        dry_run: bool,
    ) -> StoreResult<Vec<PathBuf>> {
        kind.validate(old)?;
        kind.validate(new)?;

        let files = self.candidates(kind, old)?;
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let symbol = kind.symbol();
        let pattern = Regex::new(&format!(
            "(?i){}{}",
            regex::escape(&symbol.to_string()),
            regex::escape(old)
        ))
        .map_err(|_| StoreError::InvalidName {
            kind: kind.into(),
            name: old.to_string(),
            reason: "cannot be matched",
        })?;

        let mut updated = Vec::new();
        let mut failures = Vec::new();
        for path in files {
            let entry = match self.store.parse_file(&path) {
                Ok(entry) => entry,
                Err(e) => {
                    failures.push(e);
                    continue;
                }
            };
            let body = rewrite_occurrences(entry.body(), &pattern, kind, new);
            if body == entry.body() {
                continue;
            }

            let renamed = match parse_entry(&format_entry(entry.timestamp(), &body)) {
                Ok(renamed) => renamed,
                Err(source) => {
                    failures.push(StoreError::Parse { path, source });
                    continue;
                }
            };
            if !dry_run {
                if let Err(e) = self.store.update_entry(&path, &renamed) {
                    failures.push(e);
                    continue;
                }
            }
            updated.push(path);
        }

        if !dry_run {
            info!(
                "renamed {symbol}{old} to {symbol}{new} in {} entries",
                updated.len()
            );
        }
        if failures.is_empty() {
            Ok(updated)
        } else {
            Err(StoreError::PartialFailure {
                succeeded: updated,
                failures,
            })
        }
    }
}

/// Replaces every standalone match of `pattern` (`{symbol}{old}`, any case) with the new name.
///
/// A match followed by a letter, digit, `_` or `-` is part of a longer name and stays. A mention
/// must also not follow a letter, digit or `_`, so the domain of `alice@bob.com` stays too.
fn rewrite_occurrences(body: &str, pattern: &Regex, kind: MetadataKind, new: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;
    for m in pattern.find_iter(body) {
        let before = body[..m.start()].chars().next_back();
        let after = body[m.end()..].chars().next();
        let starts_clean = kind == MetadataKind::Tag || !before.is_some_and(is_name_char);
        let ends_clean = !after.is_some_and(|c| is_name_char(c) || c == '-');
        if starts_clean && ends_clean {
            out.push_str(&body[last..m.start()]);
            out.push(kind.symbol());
            out.push_str(new);
            last = m.end();
        }
    }
    out.push_str(&body[last..]);
    out
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
