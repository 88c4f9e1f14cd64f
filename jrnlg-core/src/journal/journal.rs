//! The core `Journal` struct, the entry point for callers outside the engine.
use super::file_store::FileStore;
use super::journal_entry::{JournalEntry, Timestamp};
use super::rename::MetadataRenamer;
use super::search::{SearchEngine, SearchQuery};
use crate::config::Config;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;

/// Configuration plus the store it points at.
///
/// Reads and writes go through [`Journal::store`]; searches and renames borrow the same store,
/// so they share one cached index.
#[derive(Debug)]
pub struct Journal {
    pub config: Config,
    store: FileStore,
}

impl Journal {
    /// Creates a new `Journal` instance, loading configuration from standard paths.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::with_config(config)
    }

    /// Creates a new `Journal` instance with a specific `Config`.
    ///
    /// This also ensures that the journal's root directory exists.
    pub fn with_config(config: Config) -> Result<Self> {
        let store = FileStore::with_config(&config)
            .with_context(|| format!("opening journal at {}", config.journal_dir.display()))?;
        Ok(Self { config, store })
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn search_engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.store)
    }

    pub fn renamer(&self) -> MetadataRenamer<'_> {
        MetadataRenamer::new(&self.store)
    }

    /// The current time in the configured zone.
    pub fn now(&self) -> Timestamp {
        Utc::now().with_timezone(&self.config.timezone)
    }

    /// Saves `body` as a new entry stamped with the current time.
    pub fn create_entry(&self, body: &str) -> Result<(PathBuf, JournalEntry)> {
        let entry = JournalEntry::new(self.now(), body)?;
        let path = self.store.save_entry(&entry)?;
        Ok((path, entry))
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<JournalEntry>> {
        Ok(self.search_engine().search(query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::mk_config;
    use tempfile::tempdir;

    #[test]
    fn with_config_creates_root() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("nested").join("journal");
        let journal = Journal::with_config(mk_config(root.clone())).unwrap();
        assert!(root.is_dir());
        assert_eq!(journal.store().root(), root);
    }

    #[test]
    fn create_entry_is_searchable() {
        let tmp = tempdir().unwrap();
        let journal = Journal::with_config(mk_config(tmp.path().to_path_buf())).unwrap();
        let (path, entry) = journal.create_entry("  Shipped it #release  ").unwrap();
        assert!(path.starts_with(tmp.path()));
        assert_eq!(entry.body(), "Shipped it #release");
        assert_eq!(entry.timestamp().timezone(), journal.config.timezone);

        let query = SearchQuery {
            tags: vec!["release".into()],
            ..Default::default()
        };
        let found = journal.search(&query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body(), "Shipped it #release");
    }

    #[test]
    fn create_entry_rejects_empty_text() {
        let tmp = tempdir().unwrap();
        let journal = Journal::with_config(mk_config(tmp.path().to_path_buf())).unwrap();
        assert!(journal.create_entry("   ").is_err());
    }
}
