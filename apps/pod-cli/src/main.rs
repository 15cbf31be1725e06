//! # pod-cli
//!
//! Command-line inspection of a Proof of Day goal store.
//!
//! Reads the JSON-file store the daemon writes, without going through the
//! daemon:
//! - `pod goal list/show` — an owner's goals, or one full record
//! - `pod feed` — recently attested goals
//! - `pod users` — known usernames

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pod_goal::FileGoalStore;

/// Proof of Day CLI: read goals straight from the store.
#[derive(Parser)]
#[command(name = "pod", version, about)]
struct Cli {
    /// Goal store directory (the daemon's data_dir).
    #[arg(long, default_value = ".pod")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect goals.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Show recently attested goals.
    Feed {
        /// Maximum number of entries.
        #[arg(long, default_value_t = pod_goal::DEFAULT_FEED_LIMIT)]
        limit: usize,
    },
    /// List known usernames.
    Users,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = FileGoalStore::new(&cli.data_dir)?;

    match &cli.command {
        Commands::Goal { command } => commands::goal::execute(command, &store),
        Commands::Feed { limit } => commands::feed::execute(&store, *limit),
        Commands::Users => commands::users::execute(&store),
    }
}
