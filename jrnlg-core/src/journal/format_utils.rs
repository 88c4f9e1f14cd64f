use super::journal_entry::{JournalEntry, Timestamp};

/// Returns an output like this: `Sunday 2026-02-08 8:31 AM America/Los_Angeles`
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    format!(
        "{} {}",
        timestamp.format("%A %Y-%m-%d %-I:%M %p"),
        timestamp.timezone().name()
    )
}

/// Render an entry file. `## <header>\n\n<body>\n`
pub fn serialize_entry(entry: &JournalEntry) -> String {
    format_entry(entry.timestamp(), entry.body())
}

pub(crate) fn format_entry(timestamp: &Timestamp, body: &str) -> String {
    format!("## {}\n\n{}\n", format_timestamp(timestamp), body)
}
