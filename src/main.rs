//! # Meetwise CLI (`mw`)
//!
//! The `mw` binary is the primary interface for Meetwise. It provides
//! commands for database initialization, asking questions, searching
//! recent meetings, loading sample data, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! mw --config ./config/mw.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mw init` | Create the SQLite database and run schema migrations |
//! | `mw ask "<question>"` | Answer a question over stored documents and meetings |
//! | `mw search "<query>"` | Keyword search over recent meetings |
//! | `mw seed` | Load sample documents and meetings |
//! | `mw serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! mw init --config ./config/mw.toml
//!
//! # Load sample data
//! mw seed --config ./config/mw.toml
//!
//! # Ask a question (requires OPENAI_API_KEY or GEMINI_API_KEY)
//! mw ask "What is MongoDB used for?" --config ./config/mw.toml
//!
//! # Ask against a specific document
//! mw ask "Summarize this" --doc DOC-12345678 --config ./config/mw.toml
//!
//! # Search recent meetings
//! mw search "budget" --days 14 --config ./config/mw.toml
//!
//! # Start the HTTP server
//! mw serve --config ./config/mw.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use meetwise::{chat, config, migrate, search, seed, server};

/// Meetwise CLI — a meeting and document chatbot backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/mw.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "mw",
    about = "Meetwise — a meeting and document chatbot backend",
    version,
    long_about = "Meetwise stores documents and summarized meeting transcripts in SQLite, \
    retrieves the records relevant to a question by keyword overlap, and asks a configured \
    AI provider (OpenAI or Gemini) to answer grounded in that context."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/mw.toml`. Database, retrieval, provider,
    /// and server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/mw.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (documents, meetings). This command is idempotent — running it
    /// multiple times is safe.
    Init,

    /// Answer a question over stored documents and meetings.
    ///
    /// Retrieves relevant records by keyword overlap, assembles a
    /// context block, and asks the configured AI provider. Requires
    /// OPENAI_API_KEY or GEMINI_API_KEY to be set.
    Ask {
        /// The question to answer.
        question: String,

        /// Provider to use: `openai` or `gemini`. Falls back to the
        /// first available provider when the requested one is missing.
        #[arg(long)]
        provider: Option<String>,

        /// Restrict context to a specific document ID.
        #[arg(long)]
        doc: Option<String>,

        /// Restrict context to a specific meeting ID.
        #[arg(long)]
        meeting: Option<String>,

        /// Lookback window (days) for relevant meetings.
        #[arg(long)]
        days: Option<i64>,
    },

    /// Keyword search over recent meetings.
    ///
    /// Every whitespace-separated term must appear in the meeting's
    /// title or summary (case-insensitive).
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Lookback window in days.
        #[arg(long)]
        days: Option<i64>,
    },

    /// Load sample documents and meetings.
    ///
    /// Idempotent — records that already exist are skipped.
    Seed,

    /// Start the JSON HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves
    /// the documents, meetings, chat, and search endpoints.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ask {
            question,
            provider,
            doc,
            meeting,
            days,
        } => {
            chat::run_ask(&cfg, &question, provider, doc, meeting, days).await?;
        }
        Commands::Search { query, limit, days } => {
            let days = days.unwrap_or(cfg.retrieval.lookback_days);
            search::run_search(&cfg, &query, limit, days).await?;
        }
        Commands::Seed => {
            seed::run_seed(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
