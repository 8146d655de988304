//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mapsuggest - attribute mapping suggestions
#[derive(Parser)]
#[command(
    name = "mapsuggest",
    about = "Suggest attribute mappings from sampled account and owner values",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/mapsuggest/logs/mapsuggest.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Suggest mappings for candidate attribute matches
    Suggest {
        /// Dataset file with accounts and subjects (JSON)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Candidate attribute matches (JSON array)
        #[arg(short, long)]
        matches: PathBuf,

        /// Owned record references to use as examples (JSON array); sampled from the dataset if omitted
        #[arg(short, long)]
        refs: Option<PathBuf>,

        /// Write the suggestion here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write progress snapshots to this file
        #[arg(short, long)]
        progress_file: Option<PathBuf>,
    },

    /// Print owned record references sampled from a dataset
    Sample {
        /// Dataset file with accounts and subjects (JSON)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Maximum number of references (defaults to the configured sampling limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print the effective configuration
    ShowConfig,
}
