//! # CountNow CLI Module
//!
//! This module implements the CLI interface for CountNow.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `sessions list|show|delete|clear` - Inspect stored sessions
//! - `results` - Ranked results of a multi session
//! - `penalty` - Draw a penalty
//! - `presets` - List preset participant labels
//! - `new-room` - Allocate a room code and share link
//! - `simulate` - Replay scripted input through a counter

mod commands;
pub mod simulate;

use clap::{Parser, Subcommand};
use countnow_core::CountNowError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// CountNow - tap and hold to count
///
/// Counter server and tooling for solo and multiplayer counting games.
#[derive(Parser, Debug)]
#[command(name = "countnow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the session database (overrides config)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to the config file (default: ./countnow.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Ranked results of a multi session
    Results {
        /// Room code
        code: String,
    },

    /// Draw a penalty from the roulette
    Penalty,

    /// List preset participant labels
    Presets,

    /// Allocate an unused room code and print its share link
    NewRoom,

    /// Replay scripted input through a counter on a virtual clock
    Simulate {
        /// Steps like "down:touch@0,up:touch@1100"
        #[arg(short, long)]
        script: String,

        /// Keep running timers this long after the last step (ms)
        #[arg(long, default_value = "0")]
        settle: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Most recently updated sessions
    List,
    /// Show one session
    Show { code: String },
    /// Delete one session
    Delete { code: String },
    /// Remove sessions idle for more than an hour
    Clear,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CountNowError> {
    let mut settings = crate::config::Settings::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        settings.database = database;
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            cmd_server(&settings).await
        }
        Some(Commands::Sessions { action }) => match action {
            SessionAction::List => cmd_sessions_list(&settings, json_mode),
            SessionAction::Show { code } => cmd_session_show(&settings, json_mode, &code),
            SessionAction::Delete { code } => cmd_session_delete(&settings, &code),
            SessionAction::Clear => cmd_sessions_clear(&settings, json_mode),
        },
        Some(Commands::Results { code }) => cmd_results(&settings, json_mode, &code),
        Some(Commands::Penalty) => cmd_penalty(json_mode),
        Some(Commands::Presets) => cmd_presets(json_mode),
        Some(Commands::NewRoom) => cmd_new_room(&settings, json_mode),
        Some(Commands::Simulate { script, settle }) => cmd_simulate(json_mode, &script, settle),
        None => {
            // No subcommand - list sessions by default
            cmd_sessions_list(&settings, json_mode)
        }
    }
}
