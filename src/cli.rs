//! Command-line interface for strictly_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_connect4::GameMode;

/// Strictly Arena - connect-four server and move-sync clients
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Connect-four game server with paced autoplay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "arena.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Path to the database file (overrides config, created if missing)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Start a new game and print its id
    Start {
        /// Game mode: human-vs-auto or auto-vs-auto
        #[arg(short, long, default_value = "auto-vs-auto")]
        mode: GameMode,

        /// Label for player A
        #[arg(long)]
        player_a: Option<String>,

        /// Label for player B
        #[arg(long)]
        player_b: Option<String>,

        /// Game server URL (overrides config)
        #[arg(long)]
        server_url: Option<String>,
    },

    /// Watch an automated game move by move
    Watch {
        /// Game id
        #[arg(short, long)]
        game: String,

        /// Game server URL (overrides config)
        #[arg(long)]
        server_url: Option<String>,
    },

    /// Play the human side of a game from the terminal
    Play {
        /// Game id
        #[arg(short, long)]
        game: String,

        /// Game server URL (overrides config)
        #[arg(long)]
        server_url: Option<String>,
    },
}
