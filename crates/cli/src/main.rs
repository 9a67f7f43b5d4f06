//! Coursebot CLI, the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP API server
//! - `ask`     — Ask one question from the terminal
//! - `topics`  — Show which chapters a question would load
//! - `doctor`  — Diagnose setup
//! - `config`  — Print a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coursebot",
    about = "Coursebot — dental materials course assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ./coursebot.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        message: String,
    },

    /// Show the chapters and documents a question would load
    Topics {
        /// The question
        question: String,
    },

    /// Diagnose setup
    Doctor {
        /// Also probe a running server at this base URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Print a default config file to stdout
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask { message } => commands::ask::run(config_path, &message).await?,
        Commands::Topics { question } => commands::topics::run(config_path, &question).await?,
        Commands::Doctor { url } => commands::doctor::run(config_path, url.as_deref()).await?,
        Commands::Config => commands::config_cmd::run(),
    }

    Ok(())
}
