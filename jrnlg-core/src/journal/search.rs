//! Multi-criteria search over the store's index.
//!
//! Tags and mentions each contribute one candidate set (AND within the criterion). Every
//! keyword contributes its own set. The sets are intersected by file path.

use super::file_store::FileStore;
use super::index::EntryHandle;
use super::journal_entry::{EntryFilter, JournalEntry};
use crate::errors::StoreResult;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    pub tags: Vec<String>,
    pub mentions: Vec<String>,
    pub keywords: Vec<String>,
    pub filter: EntryFilter,
    /// Newest first when set.
    pub reverse: bool,
}

impl SearchQuery {
    pub fn has_terms(&self) -> bool {
        !(self.tags.is_empty() && self.mentions.is_empty() && self.keywords.is_empty())
    }
}

pub struct SearchEngine<'a> {
    store: &'a FileStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a FileStore) -> Self {
        Self { store }
    }

    /// Runs `query` and returns full entries, sorted and paginated.
    ///
    /// A query without terms lists the store directly instead of going through the index.
    pub fn search(&self, query: &SearchQuery) -> StoreResult<Vec<JournalEntry>> {
        if !query.has_terms() {
            return self.list_all(query);
        }

        let index = self.store.index()?;
        let mut sets: Vec<Vec<EntryHandle>> = Vec::new();
        if !query.tags.is_empty() {
            sets.push(index.search_by_tags(&query.tags));
        }
        if !query.mentions.is_empty() {
            sets.push(index.search_by_mentions(&query.mentions));
        }
        for keyword in &query.keywords {
            sets.push(index.search_by_keyword(keyword));
        }

        let mut hits = intersect(sets);
        hits.retain(|h| query.filter.matches(&h.timestamp));
        hits.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
        if query.reverse {
            hits.reverse();
        }
        debug!("search matched {} entries", hits.len());

        let entries = query
            .filter
            .paginate(hits)
            .into_iter()
            .filter_map(|h| match self.store.parse_file(&h.path) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable search hit: {e}");
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    fn list_all(&self, query: &SearchQuery) -> StoreResult<Vec<JournalEntry>> {
        let mut entries = self.store.list_entries(&query.filter.unpaginated())?;
        if query.reverse {
            entries.reverse();
        }
        Ok(query.filter.paginate(entries))
    }
}

/// Keeps the handles of the first set whose path appears in every other set.
fn intersect(sets: Vec<Vec<EntryHandle>>) -> Vec<EntryHandle> {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return Vec::new();
    };
    let others: Vec<HashSet<PathBuf>> = sets
        .map(|set| set.iter().map(|h| h.path.clone()).collect())
        .collect();
    first
        .into_iter()
        .filter(|h| others.iter().all(|paths| paths.contains(&h.path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{entry_at, la, mk_store, utc};
    use chrono::TimeZone;
    use chrono_tz::UTC;

    fn bodies(entries: &[JournalEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.body()).collect()
    }

    fn query() -> SearchQuery {
        SearchQuery::default()
    }

    fn seeded() -> (FileStore, tempfile::TempDir) {
        let (store, tmp) = mk_store();
        for (d, body) in [
            (1, "Planning #work with @alice"),
            (2, "Gym session #health"),
            (3, "Standup #work #urgent with @bob"),
            (4, "Coffee with @alice and @bob"),
            (5, "Release notes #work with @Alice, shipped"),
        ] {
            store.save_entry(&entry_at(la(2026, 2, d, 9, 0), body)).unwrap();
        }
        (store, tmp)
    }

    #[test]
    fn criteria_are_intersected() {
        let (store, _tmp) = seeded();
        let engine = SearchEngine::new(&store);

        let q = SearchQuery {
            tags: vec!["work".into()],
            mentions: vec!["alice".into()],
            ..query()
        };
        assert_eq!(
            bodies(&engine.search(&q).unwrap()),
            ["Planning #work with @alice", "Release notes #work with @Alice, shipped"]
        );

        let q = SearchQuery {
            tags: vec!["work".into()],
            mentions: vec!["alice".into()],
            keywords: vec!["SHIPPED".into()],
            ..query()
        };
        assert_eq!(
            bodies(&engine.search(&q).unwrap()),
            ["Release notes #work with @Alice, shipped"]
        );
    }

    #[test]
    fn every_keyword_must_match() {
        let (store, _tmp) = seeded();
        let engine = SearchEngine::new(&store);
        let q = SearchQuery {
            keywords: vec!["with".into(), "coffee".into()],
            ..query()
        };
        assert_eq!(bodies(&engine.search(&q).unwrap()), ["Coffee with @alice and @bob"]);

        let q = SearchQuery {
            keywords: vec!["with".into(), "nowhere".into()],
            ..query()
        };
        assert!(engine.search(&q).unwrap().is_empty());
    }

    #[test]
    fn reverse_then_paginate() {
        let (store, _tmp) = seeded();
        let engine = SearchEngine::new(&store);
        let q = SearchQuery {
            tags: vec!["work".into()],
            reverse: true,
            filter: EntryFilter::default().with_limit(2),
            ..query()
        };
        assert_eq!(
            bodies(&engine.search(&q).unwrap()),
            [
                "Release notes #work with @Alice, shipped",
                "Standup #work #urgent with @bob"
            ]
        );

        let q = SearchQuery {
            tags: vec!["work".into()],
            filter: EntryFilter::default().with_offset(1).with_limit(5),
            ..query()
        };
        assert_eq!(
            bodies(&engine.search(&q).unwrap()),
            [
                "Standup #work #urgent with @bob",
                "Release notes #work with @Alice, shipped"
            ]
        );
    }

    #[test]
    fn date_filter_applies_to_indexed_hits() {
        let (store, _tmp) = seeded();
        let engine = SearchEngine::new(&store);
        let q = SearchQuery {
            mentions: vec!["bob".into()],
            filter: EntryFilter::between(Some(utc(2026, 2, 4)), None),
            ..query()
        };
        assert_eq!(bodies(&engine.search(&q).unwrap()), ["Coffee with @alice and @bob"]);
    }

    #[test]
    fn no_terms_lists_everything() {
        let (store, _tmp) = seeded();
        let engine = SearchEngine::new(&store);
        assert_eq!(engine.search(&query()).unwrap().len(), 5);

        let q = SearchQuery {
            reverse: true,
            filter: EntryFilter::default().with_limit(2),
            ..query()
        };
        assert_eq!(
            bodies(&engine.search(&q).unwrap()),
            [
                "Release notes #work with @Alice, shipped",
                "Coffee with @alice and @bob"
            ]
        );
    }

    #[test]
    fn unknown_terms_yield_nothing() {
        let (store, _tmp) = seeded();
        let engine = SearchEngine::new(&store);
        let q = SearchQuery {
            tags: vec!["work".into(), "nonexistent".into()],
            ..query()
        };
        assert!(engine.search(&q).unwrap().is_empty());
    }

    #[test]
    fn same_second_entries_are_kept_apart() {
        let (store, _tmp) = mk_store();
        let ts = UTC.with_ymd_and_hms(2026, 2, 8, 16, 31, 0).unwrap();
        store.save_entry(&entry_at(ts, "first #a")).unwrap();
        store.save_entry(&entry_at(ts, "second #b with @carol")).unwrap();

        let engine = SearchEngine::new(&store);
        let q = SearchQuery {
            tags: vec!["a".into()],
            mentions: vec!["carol".into()],
            ..query()
        };
        assert!(engine.search(&q).unwrap().is_empty());

        let q = SearchQuery {
            tags: vec!["b".into()],
            mentions: vec!["carol".into()],
            ..query()
        };
        assert_eq!(bodies(&engine.search(&q).unwrap()), ["second #b with @carol"]);
    }
}
