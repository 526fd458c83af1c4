use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Backend for the Bionary club website.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create an admin account. An existing username is left untouched.
    CreateAdmin {
        #[clap(long, value_parser)]
        username: String,
        #[clap(long, value_parser)]
        password: String,
    },
    /// Load team members from a JSON array and create their leaderboard entries.
    /// Members without points get a score derived from name and batch.
    Seed {
        /// (file path) JSON array of `{ name, department, batch?, points?, score? }`.
        #[clap(short, long, value_parser)]
        file: PathBuf,
        /// Overwrite the score of members that already have an entry.
        #[clap(long, takes_value = false)]
        force: bool,
    },
    /// Store a derived score for every entry that has none yet.
    BackfillScores,
}
