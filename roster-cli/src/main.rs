//! Roster CLI - identity directory reports in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config, serve, token, users};

/// Roster - list identity provider users with their groups
#[derive(Parser)]
#[command(name = "roster", version, about, long_about = None)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all users with their group memberships
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Output a compact table instead of per-user blocks
        #[arg(long, conflicts_with = "json")]
        table: bool,
    },

    /// Exchange the configured credentials for an access token
    Token {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Also print the bearer token itself
        #[arg(long)]
        raw: bool,
    },

    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// Serve GET /users, which runs the report on every request
    Serve {
        /// Address to listen on (defaults to the configured bind address)
        #[arg(long)]
        bind: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve { .. }, false) => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` wins over the default level
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Users { json, table } => users::run(json, table),
        Commands::Token { json, raw } => token::run(json, raw),
        Commands::Config { command } => config::run(command),
        Commands::Serve { bind } => serve::run(bind),
    }
}
