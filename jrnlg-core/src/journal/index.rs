//! In-memory secondary index over tags, mentions and body text.
//!
//! An `Index` is built once from a file list and never mutated afterwards. Staleness is the
//! owner's business: `FileStore` throws the whole index away on every mutation.

use super::journal_entry::{IndexedEntry, JournalEntry};
use super::parse_entries::fold_case;
use super::worker_pool::run_pool;
use crate::errors::StoreResult;
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to one indexed entry.
pub type EntryHandle = Arc<IndexedEntry>;

#[derive(Debug, Default)]
pub struct Index {
    entries: Vec<EntryHandle>,
    tag_index: HashMap<String, Vec<EntryHandle>>,
    mention_index: HashMap<String, Vec<EntryHandle>>,
    body_map: HashMap<PathBuf, String>,
}

impl Index {
    /// Parses `files` on `max(1, worker_count)` threads and indexes every entry that parses.
    ///
    /// Files that fail to parse are left out silently, the same way listings skip them.
    pub fn build<F>(files: Vec<PathBuf>, worker_count: usize, parse: F) -> Self
    where
        F: Fn(&Path) -> StoreResult<JournalEntry> + Sync,
    {
        let total = files.len();
        let mut index = Index::default();
        for (path, result) in run_pool(files, worker_count, parse) {
            if let Ok(entry) = result {
                index.insert(path, entry);
            }
        }
        debug!("index built: {} of {total} files indexed", index.len());
        index
    }

    fn insert(&mut self, path: PathBuf, entry: JournalEntry) {
        let handle = Arc::new(IndexedEntry::from_entry(path.clone(), &entry));
        for tag in entry.tags() {
            self.tag_index
                .entry(fold_case(tag))
                .or_default()
                .push(Arc::clone(&handle));
        }
        for mention in entry.mentions() {
            self.mention_index
                .entry(fold_case(mention))
                .or_default()
                .push(Arc::clone(&handle));
        }
        self.body_map.insert(path, entry.body().to_string());
        self.entries.push(handle);
    }

    /// Entries carrying every one of `tags` (AND). Empty input matches nothing.
    pub fn search_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<EntryHandle> {
        search_all(&self.tag_index, tags, |e| &e.tags)
    }

    /// Entries carrying every one of `mentions` (AND). Empty input matches nothing.
    pub fn search_by_mentions<S: AsRef<str>>(&self, mentions: &[S]) -> Vec<EntryHandle> {
        search_all(&self.mention_index, mentions, |e| &e.mentions)
    }

    /// Case-insensitive substring scan over every body. An empty keyword matches nothing.
    pub fn search_by_keyword(&self, keyword: &str) -> Vec<EntryHandle> {
        if keyword.is_empty() {
            return Vec::new();
        }
        let needle = fold_case(keyword);
        self.entries
            .iter()
            .filter(|e| {
                self.body_map
                    .get(&e.path)
                    .is_some_and(|body| fold_case(body).contains(&needle))
            })
            .cloned()
            .collect()
    }

    pub fn entries_for_tag(&self, tag: &str) -> &[EntryHandle] {
        self.tag_index
            .get(&fold_case(tag))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entries_for_mention(&self, mention: &str) -> &[EntryHandle] {
        self.mention_index
            .get(&fold_case(mention))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_body(&self, path: &Path) -> Option<&str> {
        self.body_map.get(path).map(String::as_str)
    }

    /// Every indexed entry, in no particular order. Read-only view for reporting.
    pub fn entries(&self) -> &[EntryHandle] {
        &self.entries
    }

    /// Number of entries per tag.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        counts(&self.tag_index)
    }

    /// Number of entries per mention.
    pub fn mention_counts(&self) -> BTreeMap<String, usize> {
        counts(&self.mention_index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn search_all<S, F>(
    buckets: &HashMap<String, Vec<EntryHandle>>,
    terms: &[S],
    field: F,
) -> Vec<EntryHandle>
where
    S: AsRef<str>,
    F: Fn(&IndexedEntry) -> &Vec<String>,
{
    let keys: Vec<String> = terms.iter().map(|t| fold_case(t.as_ref())).collect();
    let Some((first, rest)) = keys.split_first() else {
        return Vec::new();
    };
    let Some(candidates) = buckets.get(first) else {
        return Vec::new();
    };
    candidates
        .iter()
        .filter(|e| {
            let have: HashSet<&str> = field(e).iter().map(String::as_str).collect();
            rest.iter().all(|k| have.contains(k.as_str()))
        })
        .cloned()
        .collect()
}

fn counts(buckets: &HashMap<String, Vec<EntryHandle>>) -> BTreeMap<String, usize> {
    buckets
        .iter()
        .map(|(key, entries)| (key.clone(), entries.len()))
        .collect()
}
