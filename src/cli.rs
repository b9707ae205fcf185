use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "plexscrub",
    version,
    about = "Preview and delete Plex watch history entries"
)]
pub struct Cli {
    /// Log every request and rate-limit wait to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Seconds to wait after each delete attempt
    #[arg(long, global = true, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Start from this pagination cursor instead of the first page
    #[arg(long, global = true, value_name = "CURSOR")]
    pub after: Option<String>,

    /// Give up on an entry after this many rate-limit waits (default: keep waiting)
    #[arg(long, global = true, value_name = "N")]
    pub max_rate_limit_retries: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu (default)
    Menu,
    /// Delete watch history entries
    Delete {
        /// Only consider entries of this kind
        #[arg(long, value_enum)]
        only: Option<OnlyKind>,
        /// Delete without asking for each entry
        #[arg(short, long)]
        yes: bool,
    },
    /// List what would be deleted without deleting anything
    Preview {
        #[arg(long, value_enum)]
        only: Option<OnlyKind>,
    },
    /// Print where the config and user id files live
    ConfigPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnlyKind {
    Movie,
    Episode,
}
