//! # Price Comparison Service Entry Point
//!
//! `serve` (the default) migrates, seeds and starts the HTTP server;
//! `migrate` stops after seeding.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use price_comparison::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[derive(Debug, Parser)]
#[command(name = "price-comparison")]
#[command(about = "Procurement price comparisons with maker/checker review", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Apply migrations and seed data, then exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;

    telemetry::init_tracing(&config).context("initializing tracing")?;
    match config.redacted_json() {
        Ok(redacted) => tracing::info!(profile = %config.profile, config = %redacted, "Configuration loaded"),
        Err(error) => tracing::warn!(%error, "Could not render configuration"),
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&db).await?;
    seeds::seed_all(&db, &config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            tracing::info!("Migrations and seeding complete");
            Ok(())
        }
        Command::Serve => run_server(config, db).await,
    }
}
