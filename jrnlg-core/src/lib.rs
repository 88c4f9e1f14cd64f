pub mod config;
pub mod errors;
pub mod journal;
pub mod logging;

pub use config::Config;
pub use errors::{ParseError, StoreError, StoreResult};
pub use journal::{
    EntryFilter, FileStore, Index, IndexedEntry, Journal, JournalEntry, MetadataKind,
    MetadataRenamer, SearchEngine, SearchQuery, Timestamp,
};

#[cfg(test)]
mod tests {
    mod common;

    pub(crate) use common::*;
}
