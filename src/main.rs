//! Chat History Export - Save the message history of a chat or channel as JSON.
//!
//! Resolves a chat by (part of) its name, pages through its history from an
//! offset date, normalizes every message into a flat record and writes the
//! records as a single pretty-printed JSON array.
//!
//!   chat-history "Rust News"                          # export, default file name
//!   chat-history News --offset-date 2024-01-01 -v     # only recent messages
//!   chat-history News --choice 2 --file news.json     # non-interactive pick

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    default_output_file, format_document_json, format_stats, ConsoleSelector, ExportPipeline,
    FixedSelector, SelectionStrategy, Stage,
};
use cli::Cli;
use domain::{AppConfig, AppError};
use infrastructure::{load_config, write_document, GatewayClient, Session, SessionStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let credentials = cli.credentials()?;

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = &cli.gateway_url {
        config.gateway.base_url.clone_from(url);
    }
    if cli.ignore_case {
        config.resolve.case_sensitive = false;
    }

    let query = cli.chat_query();
    tracing::info!("Checking API connection for {}", query);
    tracing::info!("API ID: {}", credentials.api_id);

    let store = SessionStore::open(&config.session_db_path())?;
    let client = GatewayClient::new(config.gateway.base_url.clone());
    let session = Session::open(client, &credentials, Some(&store)).await?;
    tracing::debug!(account_id = session.account().id, "Authenticated");

    let result = export(&cli, &config, &session, &query).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close session: {}", e);
    }

    result
}

/// Runs the pipeline and writes its document.
async fn export(
    cli: &Cli,
    config: &AppConfig,
    session: &Session<GatewayClient>,
    query: &str,
) -> domain::Result<()> {
    let pipeline = ExportPipeline::from_config(config);
    let selector: Box<dyn SelectionStrategy> = match cli.choice {
        Some(choice) => Box::new(FixedSelector(choice)),
        None => Box::new(ConsoleSelector),
    };

    let report = pipeline
        .run(session, query, &cli.fetch_options(), selector.as_ref())
        .await?;

    let path = cli
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_file(&report.chat.display_name)));

    if report.document.is_empty() {
        tracing::warn!("No messages to export from {}", report.chat.display_name);
    }

    tracing::debug!(stage = %Stage::Writing);
    tracing::info!("Saving messages to {}", path.display());
    let content = format_document_json(&report.document).map_err(AppError::serialization)?;
    write_document(&path, &content)?;
    tracing::debug!(stage = %Stage::Done);

    println!(
        "{} Exported {} messages from {} to {}",
        "✓".green().bold(),
        report.stats.exported,
        report.chat.display_name.cyan(),
        path.display()
    );
    println!();
    println!("{}", format_stats(&report.stats));

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
