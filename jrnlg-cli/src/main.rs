mod cli;
mod dates;
mod render;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command, MetadataAction, RangeArgs};
use dates::{DayEdge, parse_bound, parse_instant};
use jrnlg_core::{
    EntryFilter, Journal, MetadataKind, SearchQuery, StoreError, logging::init_logging,
};
use log::debug;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jrnlg: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let journal = Journal::new()?;
    init_logging(&journal.config.log_level);
    debug!("journal root: {}", journal.config.journal_dir.display());

    match cli.command {
        Command::Path => {
            render::print_info(&format!("{}", journal.config.journal_dir.display()));
        }
        Command::Write { text } => {
            let (path, entry) = journal.create_entry(&text.join(" "))?;
            render::print_info(&format!("Added new entry to {}", path.display()));
            if !entry.tags().is_empty() {
                render::print_info(&format!("tags: {}", entry.tags().join(", ")));
            }
        }
        Command::List { range } => {
            let query = SearchQuery {
                filter: build_filter(&journal, &range)?,
                reverse: range.reverse,
                ..Default::default()
            };
            render::print_entries(&journal.search(&query)?);
        }
        Command::Search {
            tags,
            mentions,
            keywords,
            range,
        } => {
            let query = SearchQuery {
                tags: strip_symbol(tags, '#'),
                mentions: strip_symbol(mentions, '@'),
                keywords,
                filter: build_filter(&journal, &range)?,
                reverse: range.reverse,
            };
            render::print_entries(&journal.search(&query)?);
        }
        Command::Show { timestamp } => {
            let ts = parse_instant(&timestamp, journal.config.timezone)?;
            let entry = journal.store().get_entry(&ts)?;
            render::print_entries(&[entry]);
        }
        Command::Delete { from, to } => {
            let range = RangeArgs {
                from: Some(from),
                to: Some(to),
                ..Default::default()
            };
            let filter = build_filter(&journal, &range)?;
            match journal.store().delete_entries(&filter) {
                Ok(deleted) => render::print_paths("Deleted", &deleted),
                Err(e) => return Err(report_partial("Deleted", e)),
            }
        }
        Command::Tags { action } => metadata(&journal, MetadataKind::Tag, action)?,
        Command::Mentions { action } => metadata(&journal, MetadataKind::Mention, action)?,
    }
    Ok(())
}

fn build_filter(journal: &Journal, range: &RangeArgs) -> Result<EntryFilter> {
    let tz = journal.config.timezone;
    let start = range
        .from
        .as_deref()
        .map(|s| parse_bound(s, tz, DayEdge::Start))
        .transpose()?;
    let end = range
        .to
        .as_deref()
        .map(|s| parse_bound(s, tz, DayEdge::End))
        .transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("--from must not be after --to");
        }
    }
    Ok(EntryFilter {
        start,
        end,
        limit: range.limit,
        offset: range.offset,
    })
}

fn strip_symbol(names: Vec<String>, symbol: char) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.strip_prefix(symbol).map(str::to_string).unwrap_or(n))
        .collect()
}

fn metadata(journal: &Journal, kind: MetadataKind, action: Option<MetadataAction>) -> Result<()> {
    let symbol = kind.symbol();
    match action.unwrap_or(MetadataAction::List) {
        MetadataAction::List => {
            let index = journal.store().index()?;
            let counts = match kind {
                MetadataKind::Tag => index.tag_counts(),
                MetadataKind::Mention => index.mention_counts(),
            };
            render::print_counts(symbol, &counts);
        }
        MetadataAction::Rename { old, new, dry_run } => {
            let old = old.trim_start_matches(symbol);
            let new = new.trim_start_matches(symbol);
            let renamer = journal.renamer();
            let existing = renamer.candidates(kind, new)?;
            if !existing.is_empty() {
                render::print_info(&format!(
                    "Warning: {symbol}{new} already exists in {} {} ({kind}s will be merged)",
                    existing.len(),
                    render::plural("entry", existing.len())
                ));
            }
            match renamer.replace(kind, old, new, dry_run) {
                Ok(paths) if paths.is_empty() => {
                    render::print_info(&format!("No entries found with {symbol}{old}"));
                }
                Ok(paths) if dry_run => render::print_paths(
                    &format!("Would rename {symbol}{old} to {symbol}{new} in"),
                    &paths,
                ),
                Ok(paths) => render::print_paths(
                    &format!("Renamed {symbol}{old} to {symbol}{new} in"),
                    &paths,
                ),
                Err(e) => return Err(report_partial("Renamed in", e)),
            }
        }
    }
    Ok(())
}

/// Prints what a failed batch still managed to change, then hands the error back.
fn report_partial(verb: &str, err: StoreError) -> anyhow::Error {
    if !err.succeeded().is_empty() {
        render::print_paths(verb, err.succeeded());
    }
    err.into()
}
