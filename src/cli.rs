use cinefeed_common::MediaKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cinefeed")]
#[command(author, version, about = "Media discovery feed: hero carousel, home rows, continue watching")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the hero feed until it settles and print the slides
    Hero {
        /// Render as a small screen (no trailer embeds)
        #[arg(long)]
        small_screen: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Give up waiting for enrichment after this many seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Load and print the home page rows
    Rows {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the continue-watching list
    Continue {
        #[command(subcommand)]
        action: ContinueAction,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum ContinueAction {
    /// List entries, oldest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record that playback started
    Add {
        /// Media kind (movie or tv)
        kind: MediaKind,

        /// Catalog id
        id: u64,

        /// Season number (series only)
        #[arg(long)]
        season: Option<u32>,

        /// Episode number (series only)
        #[arg(long)]
        episode: Option<u32>,

        /// Display title stored with the entry
        #[arg(long)]
        title: Option<String>,
    },

    /// Remove an entry
    Remove {
        /// Media kind (movie or tv)
        kind: MediaKind,

        /// Catalog id
        id: u64,
    },

    /// Remove every entry
    Clear,
}
