//! On-disk storage of journal entries, one markdown file per entry.
//!
//! Layout: `{root}/YYYY/MM/YYYY-MM-DD-HH-MM-SS.md` in UTC. Entries sharing a second get
//! `-01`, `-02`, ... suffixes in save order.
//!
//! The store owns a lazily built [`Index`]. Every mutation bumps a generation counter; the
//! next index access notices its cached copy is from an older generation and rebuilds it.

use super::format_utils::serialize_entry;
use super::index::{EntryHandle, Index};
use super::journal_entry::{EntryFilter, JournalEntry, Timestamp};
use super::parse_entries::parse_entry;
use super::path_utils::{
    collision_candidates, ensure_parent, entry_file, entry_file_stem, scan_month_dirs,
};
use super::worker_pool::run_pool;
use crate::config::Config;
use crate::errors::{StoreError, StoreResult};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    parse_workers: usize,
    generation: AtomicU64,
    index: RwLock<Option<CachedIndex>>,
}

#[derive(Debug)]
struct CachedIndex {
    generation: u64,
    built: Result<Arc<Index>, Arc<StoreError>>,
}

impl CachedIndex {
    fn get(&self) -> StoreResult<Arc<Index>> {
        self.built
            .clone()
            .map_err(StoreError::IndexUnavailable)
    }
}

impl FileStore {
    /// Opens (and creates, if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, parse_workers: usize) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io("create directory", &root, e))?;
        Ok(Self {
            root,
            parse_workers: parse_workers.max(1),
            generation: AtomicU64::new(0),
            index: RwLock::new(None),
        })
    }

    pub fn with_config(config: &Config) -> StoreResult<Self> {
        Self::open(&config.journal_dir, config.parse_workers())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn parse_workers(&self) -> usize {
        self.parse_workers
    }

    /// Writes a new entry and returns the path it landed on.
    ///
    /// Fails with [`StoreError::CollisionExhausted`] when the bare name and every suffix are
    /// taken.
    ///
    /// A slot is claimed by a rename that refuses to overwrite, so concurrent saves of the same
    /// second each land on their own file.
    pub fn save_entry(&self, entry: &JournalEntry) -> StoreResult<PathBuf> {
        let canonical = entry_file(&self.root, entry.timestamp());
        ensure_parent(&canonical)?;
        let mut tmp = write_temp(&canonical, serialize_entry(entry).as_bytes())?;

        for path in collision_candidates(&canonical) {
            if path.exists() {
                continue;
            }
            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    self.invalidate_index();
                    info!("saved entry {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(StoreError::io("rename into", path, e.error)),
            }
        }
        Err(StoreError::CollisionExhausted(entry_file_stem(entry.timestamp())))
    }

    /// The first entry saved at `timestamp` (to the second).
    pub fn get_entry(&self, timestamp: &Timestamp) -> StoreResult<JournalEntry> {
        let canonical = entry_file(&self.root, timestamp);
        for (i, path) in collision_candidates(&canonical).enumerate() {
            if let Ok(entry) = self.parse_file(&path) {
                return Ok(entry);
            }
            if i > 0 && !path.exists() {
                break;
            }
        }
        Err(StoreError::NotFound(entry_file_stem(timestamp)))
    }

    /// Path of the first existing file for `timestamp`, found the same way as `get_entry`.
    pub fn get_entry_path(&self, timestamp: &Timestamp) -> StoreResult<PathBuf> {
        let canonical = entry_file(&self.root, timestamp);
        for (i, path) in collision_candidates(&canonical).enumerate() {
            if path.exists() {
                return Ok(path);
            }
            if i > 0 {
                break;
            }
        }
        Err(StoreError::NotFound(entry_file_stem(timestamp)))
    }

    /// Entries matching `filter`, oldest first, with `offset`/`limit` applied last.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn list_entries(&self, filter: &EntryFilter) -> StoreResult<Vec<JournalEntry>> {
        let files = scan_month_dirs(&self.root, filter)?;
        let mut entries = Vec::with_capacity(files.len());

        for (path, result) in run_pool(files, self.parse_workers, |p| self.parse_file(p)) {
            match result {
                Ok(entry) if filter.matches(entry.timestamp()) => entries.push(entry),
                Ok(_) => {}
                Err(e) => warn!("skipping invalid file during list {}: {e}", path.display()),
            }
        }

        entries.sort_by(|a, b| a.timestamp().cmp(b.timestamp()));
        Ok(filter.paginate(entries))
    }

    /// Overwrites the entry at an already-resolved `path`.
    pub fn update_entry(&self, path: &Path, entry: &JournalEntry) -> StoreResult<()> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        write_atomic(path, serialize_entry(entry).as_bytes())?;
        self.invalidate_index();
        info!("updated entry {}", path.display());
        Ok(())
    }

    pub fn delete_entry(&self, path: &Path) -> StoreResult<()> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        fs::remove_file(path).map_err(|e| StoreError::io("delete", path, e))?;
        self.invalidate_index();
        info!("deleted entry {}", path.display());
        Ok(())
    }

    /// Deletes every entry matching the date bounds of `filter`.
    ///
    /// Returns the deleted paths. If any deletion fails the result is a
    /// [`StoreError::PartialFailure`] that still lists what was deleted.
    pub fn delete_entries(&self, filter: &EntryFilter) -> StoreResult<Vec<PathBuf>> {
        let files = scan_month_dirs(&self.root, filter)?;
        let mut doomed: Vec<(PathBuf, Timestamp)> =
            run_pool(files, self.parse_workers, |p| self.parse_file(p))
                .into_iter()
                .filter_map(|(path, result)| match result {
                    Ok(entry) if filter.matches(entry.timestamp()) => {
                        Some((path, *entry.timestamp()))
                    }
                    Ok(_) => None,
                    Err(e) => {
                        warn!("skipping invalid file during delete {}: {e}", path.display());
                        None
                    }
                })
                .collect();
        doomed.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let mut deleted = Vec::new();
        let mut failures = Vec::new();
        for (path, _) in doomed {
            match fs::remove_file(&path) {
                Ok(()) => deleted.push(path),
                Err(e) => failures.push(StoreError::io("delete", path, e)),
            }
        }

        if !deleted.is_empty() {
            self.invalidate_index();
            info!("deleted {} entries", deleted.len());
        }
        if failures.is_empty() {
            Ok(deleted)
        } else {
            Err(StoreError::PartialFailure {
                succeeded: deleted,
                failures,
            })
        }
    }

    /// Entries carrying all of `tags`, restricted and paginated by `filter`.
    pub fn search_by_tags<S: AsRef<str>>(
        &self,
        tags: &[S],
        filter: &EntryFilter,
    ) -> StoreResult<Vec<JournalEntry>> {
        let index = self.index()?;
        Ok(self.load_indexed(index.search_by_tags(tags), filter))
    }

    /// Entries carrying all of `mentions`, restricted and paginated by `filter`.
    pub fn search_by_mentions<S: AsRef<str>>(
        &self,
        mentions: &[S],
        filter: &EntryFilter,
    ) -> StoreResult<Vec<JournalEntry>> {
        let index = self.index()?;
        Ok(self.load_indexed(index.search_by_mentions(mentions), filter))
    }

    /// Entries whose body contains `keyword`, restricted and paginated by `filter`.
    pub fn search_by_keyword(
        &self,
        keyword: &str,
        filter: &EntryFilter,
    ) -> StoreResult<Vec<JournalEntry>> {
        let index = self.index()?;
        Ok(self.load_indexed(index.search_by_keyword(keyword), filter))
    }

    /// Date-filters index hits, sorts them oldest first, reads the full entries and paginates.
    pub(crate) fn load_indexed(
        &self,
        mut hits: Vec<EntryHandle>,
        filter: &EntryFilter,
    ) -> Vec<JournalEntry> {
        hits.retain(|h| filter.matches(&h.timestamp));
        hits.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
        let entries = hits
            .iter()
            .filter_map(|h| match self.parse_file(&h.path) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable search hit: {e}");
                    None
                }
            })
            .collect();
        filter.paginate(entries)
    }

    /// The current index, building it if none exists for this generation.
    ///
    /// Concurrent first callers share one build; a build error is cached the same way a built
    /// index is, until the next mutation.
    pub fn index(&self) -> StoreResult<Arc<Index>> {
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(cached) = self.index.read().as_ref() {
            if cached.generation == generation {
                return cached.get();
            }
        }

        let mut slot = self.index.write();
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(cached) = slot.as_ref() {
            if cached.generation == generation {
                return cached.get();
            }
        }

        debug!("building index for generation {generation}");
        let built = self.build_index().map(Arc::new).map_err(Arc::new);
        let cached = CachedIndex { generation, built };
        let result = cached.get();
        *slot = Some(cached);
        result
    }

    /// Marks the cached index stale. The next access rebuilds it.
    pub fn invalidate_index(&self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        debug!("index invalidated (generation {} -> {})", previous, previous + 1);
    }

    fn build_index(&self) -> StoreResult<Index> {
        let files = scan_month_dirs(&self.root, &EntryFilter::default())?;
        Ok(Index::build(files, self.parse_workers, |p| self.parse_file(p)))
    }

    /// Reads and parses one entry file.
    pub fn parse_file(&self, path: &Path) -> StoreResult<JournalEntry> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
            _ => StoreError::io("read", path, e),
        })?;
        parse_entry(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Overwrites `path` by writing a temporary file beside it and renaming it into place.
///
/// Readers only ever see the old file or the complete new one.
fn write_atomic(path: &Path, content: &[u8]) -> StoreResult<()> {
    write_temp(path, content)?
        .persist(path)
        .map_err(|e| StoreError::io("rename into", path, e.error))?;
    Ok(())
}

/// A fully written, synced temporary file in the directory of `target`.
///
/// The file is removed when dropped, so every failure path cleans up after itself.
fn write_temp(target: &Path, content: &[u8]) -> StoreResult<NamedTempFile> {
    let dir = target
        .parent()
        .ok_or_else(|| StoreError::io("write", target, io::ErrorKind::InvalidInput.into()))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(dir)
        .map_err(|e| StoreError::io("create temporary file in", dir, e))?;
    tmp.write_all(content)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io("write", tmp.path().to_path_buf(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| StoreError::io("set permissions on", tmp.path().to_path_buf(), e))?;
    }
    Ok(tmp)
}
