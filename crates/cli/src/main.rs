//! StudyMate CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive chat or single-message mode
//! - `doctor` — Diagnose configuration and backend health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "studymate",
    about = "StudyMate — a multi-agent study assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with StudyMate
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Response language (ISO 639-1, e.g. "en" or "es")
        #[arg(short, long)]
        language: Option<String>,

        /// Your display name, used to personalize responses
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Diagnose configuration and backend health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            language,
            name,
        } => commands::chat::run(message, language, name).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
