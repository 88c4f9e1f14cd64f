use crate::journal::{FileStore, JournalEntry, Timestamp};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use tempfile::{TempDir, tempdir};

/// A store rooted at `{tmp}/journal` with four parse workers.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub fn mk_store() -> (FileStore, TempDir) {
    let tmp = tempdir().expect("create temp dir");
    let store = FileStore::open(tmp.path().join("journal"), 4).expect("open store");
    (store, tmp)
}

/// Wall-clock time in Los Angeles.
pub fn la(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Timestamp {
    Los_Angeles
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("unambiguous local time")
}

/// Midnight UTC on the given day.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn entry_at(timestamp: Timestamp, body: &str) -> JournalEntry {
    JournalEntry::new(timestamp, body).expect("valid entry")
}
