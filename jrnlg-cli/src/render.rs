use jrnlg_core::JournalEntry;
use jrnlg_core::journal::serialize_entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn print_info(msg: &str) {
    println!("{msg}");
}

/// Prints entries in their on-disk form, separated by blank lines.
pub fn print_entries(entries: &[JournalEntry]) {
    if entries.is_empty() {
        print_info("No entries found.");
        return;
    }
    let blocks: Vec<String> = entries.iter().map(serialize_entry).collect();
    print!("{}", blocks.join("\n"));
}

/// `name (n entries)` per line, most used first.
pub fn print_counts(symbol: char, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        print_info("Nothing found.");
        return;
    }
    for line in count_lines(symbol, counts) {
        println!("{line}");
    }
}

fn count_lines(symbol: char, counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut sorted: Vec<(&String, &usize)> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .map(|(name, n)| format!("{symbol}{name} ({n} {})", plural("entry", *n)))
        .collect()
}

pub fn print_paths(verb: &str, paths: &[PathBuf]) {
    print_info(&format!("{verb} {} {}", paths.len(), plural("entry", paths.len())));
    for p in paths {
        println!("  {}", p.display());
    }
}

pub fn plural(word: &str, n: usize) -> String {
    match (word, n) {
        (_, 1) => word.to_string(),
        ("entry", _) => "entries".to_string(),
        _ => format!("{word}s"),
    }
}
