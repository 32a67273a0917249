//! Command-line interface definitions for docsite

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_OUTLINE_CAP: usize = 400;

/// Replays page interactions against a documentation page and prints the resulting DOM
#[derive(Parser)]
#[command(name = "docsite")]
#[command(version)]
#[command(about = "Documentation-site page behaviors harness", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a page, install every behavior and replay a scenario
    Run {
        /// HTML page to load
        page: PathBuf,

        /// Scenario file (TOML): viewport, layout boxes and events
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Behavior configuration (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file standing in for local storage; in-memory when omitted
        #[arg(long)]
        storage: Option<PathBuf>,

        /// Maximum number of outline lines to print
        #[arg(long, default_value_t = DEFAULT_OUTLINE_CAP)]
        outline_cap: usize,
    },

    /// Print the parsed DOM of a page
    Outline {
        /// HTML page to load
        page: PathBuf,

        /// Maximum number of outline lines to print
        #[arg(long, default_value_t = DEFAULT_OUTLINE_CAP)]
        outline_cap: usize,
    },
}
