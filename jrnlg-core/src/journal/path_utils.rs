use super::journal_entry::{EntryFilter, Timestamp};
use crate::errors::{StoreError, StoreResult};
use chrono::{Datelike, Utc};
use log::warn;
use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

pub const MARKDOWN_EXT: &str = "md";
/// Suffixes `-01` through `-99` are tried after the bare name.
pub const MAX_COLLISION_ATTEMPTS: usize = 100;
pub const DEFAULT_START_YEAR: i32 = 1900;
pub const DEFAULT_END_YEAR: i32 = 2100;

pub fn year_folder_name(year: i32) -> String {
    format!("{year:04}")
}

pub fn month_folder_name(month: u32) -> String {
    format!("{month:02}")
}

/// `YYYY-MM-DD-HH-MM-SS`, always in UTC.
pub fn entry_file_stem(timestamp: &Timestamp) -> String {
    timestamp
        .with_timezone(&Utc)
        .format("%Y-%m-%d-%H-%M-%S")
        .to_string()
}

/// `{root}/YYYY/MM/YYYY-MM-DD-HH-MM-SS.md`, UTC-normalized and truncated to whole seconds.
pub fn entry_file(root: &Path, timestamp: &Timestamp) -> PathBuf {
    let utc = timestamp.with_timezone(&Utc);
    root.join(year_folder_name(utc.year()))
        .join(month_folder_name(utc.month()))
        .join(format!("{}.{MARKDOWN_EXT}", entry_file_stem(timestamp)))
}

/// The canonical path followed by every suffixed variant, in lookup order.
pub fn collision_candidates(canonical: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let stem = canonical
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_string();
    std::iter::once(canonical.to_path_buf()).chain(
        (1..MAX_COLLISION_ATTEMPTS)
            .map(move |i| canonical.with_file_name(format!("{stem}-{i:02}.{MARKDOWN_EXT}"))),
    )
}

/// Year/month span to scan for `filter`, in UTC.
pub fn scan_span(filter: &EntryFilter) -> ((i32, u32), (i32, u32)) {
    let start = filter
        .start
        .map(|d| (d.year(), d.month()))
        .unwrap_or((DEFAULT_START_YEAR, 1));
    let end = filter
        .end
        .map(|d| (d.year(), d.month()))
        .unwrap_or((DEFAULT_END_YEAR, 12));
    (start, end)
}

/// Markdown files under the month directories covered by `filter`.
///
/// Missing year or month directories are skipped; so are unreadable month directories, with a
/// warning. Hidden files (leftover temporaries) are never returned.
pub fn scan_month_dirs(root: &Path, filter: &EntryFilter) -> StoreResult<Vec<PathBuf>> {
    let ((start_year, start_month), (end_year, end_month)) = scan_span(filter);
    let mut files = Vec::new();

    for year in start_year..=end_year {
        let year_dir = root.join(year_folder_name(year));
        if !year_dir.is_dir() {
            continue;
        }
        let first = if year == start_year { start_month } else { 1 };
        let last = if year == end_year { end_month } else { 12 };

        for month in first..=last {
            let month_dir = year_dir.join(month_folder_name(month));
            if !month_dir.is_dir() {
                continue;
            }
            match list_markdown_files(&month_dir) {
                Ok(found) => files.extend(found),
                Err(e) => warn!("skipping unreadable directory {}: {e}", month_dir.display()),
            }
        }
    }

    Ok(files)
}

fn list_markdown_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut file_paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let p = entry?.path();
        if p.is_file() && is_markdown(&p) && !is_hidden(&p) {
            file_paths.push(p);
        }
    }
    Ok(file_paths)
}

pub fn is_markdown(p: &Path) -> bool {
    p.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXT))
        .unwrap_or(false)
}

fn is_hidden(p: &Path) -> bool {
    p.file_name()
        .and_then(OsStr::to_str)
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Creates the year/month directories for `file`.
pub fn ensure_parent(file: &Path) -> StoreResult<()> {
    match file.parent() {
        Some(parent) => fs::create_dir_all(parent)
            .map_err(|e| StoreError::io("create directory", parent, e)),
        None => Ok(()),
    }
}
