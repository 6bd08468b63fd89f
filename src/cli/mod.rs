pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "friend-circle")]
#[command(about = "Aggregate recent posts from a circle of friends' blogs", long_about = None)]
pub struct Cli {
    /// Settings file
    #[arg(short, long, default_value = "settings.yaml", global = true)]
    pub config: PathBuf,

    /// Theme presets for friends pages
    #[arg(short, long, default_value = "rules.yaml", global = true)]
    pub rules: PathBuf,

    /// Where the JSON snapshot is written
    #[arg(short, long, default_value = "data.json", global = true)]
    pub export: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Discover feeds for every friend and store their posts (default)
    Run,
    /// Print the friends found on the configured friends pages
    Discover,
    /// Write the stored friends and posts to the export file
    Export,
    /// Find the feed URL of a single site
    Find {
        /// Site URL
        site: String,

        /// Feed path to try first
        #[arg(short, long, default_value = "")]
        suffix: String,
    },
}

impl Cli {
    pub fn action(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}
