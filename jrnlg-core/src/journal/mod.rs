mod file_store;
mod format_utils;
mod index;
mod journal;
mod journal_entry;
pub(crate) mod parse_entries;
mod path_utils;
mod rename;
mod search;
mod worker_pool;

pub use file_store::FileStore;
pub use format_utils::{format_timestamp, serialize_entry};
pub use index::{EntryHandle, Index};
pub use journal::Journal;
pub use journal_entry::{EntryFilter, IndexedEntry, JournalEntry, Timestamp};
pub use parse_entries::{
    MAX_MENTION_LENGTH, MAX_TAG_LENGTH, extract_mentions, extract_tags, fold_case, parse_entry,
    parse_timestamp,
};
pub use path_utils::{MAX_COLLISION_ATTEMPTS, entry_file};
pub use rename::{MetadataKind, MetadataRenamer};
pub use search::{SearchEngine, SearchQuery};
pub use worker_pool::run_pool;
