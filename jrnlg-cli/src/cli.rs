use clap::{Args, Parser, Subcommand};

/// jrnlg: Markdown journal with tags, mentions and search
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prints the journal root directory
    Path,
    /// Saves a new entry stamped with the current time (e.g., `jrnlg write Met @alice about #work`)
    Write {
        #[arg(required = true, num_args(1..))]
        text: Vec<String>,
    },
    /// Lists entries, oldest first
    List {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Finds entries carrying every given tag, mention and keyword
    Search {
        /// Tag to require, without `#` (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
        /// Mention to require, without `@` (repeatable)
        #[arg(long = "mention", short = 'm')]
        mentions: Vec<String>,
        /// Case-insensitive text to require in the body
        keywords: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Shows the entry written at a given time (RFC 3339, or `YYYY-MM-DDTHH:MM:SS` local time)
    Show { timestamp: String },
    /// Deletes every entry within a date range
    Delete {
        #[arg(long, required = true)]
        from: String,
        #[arg(long, required = true)]
        to: String,
    },
    /// Lists or renames tags
    Tags {
        #[command(subcommand)]
        action: Option<MetadataAction>,
    },
    /// Lists or renames mentions
    Mentions {
        #[command(subcommand)]
        action: Option<MetadataAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MetadataAction {
    /// Shows every name with its entry count
    List,
    /// Renames OLD to NEW in every entry; merges when NEW already exists
    Rename {
        old: String,
        new: String,
        /// Reports what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Date bounds and paging shared by `list` and `search`.
#[derive(Args, Debug, Default)]
pub struct RangeArgs {
    /// Earliest date, inclusive (`YYYY-MM-DD` or RFC 3339)
    #[arg(long)]
    pub from: Option<String>,
    /// Latest date, inclusive (`YYYY-MM-DD` or RFC 3339)
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Newest first
    #[arg(long, short)]
    pub reverse: bool,
}
