// ABOUTME: Ironlog API server binary
// ABOUTME: Loads environment configuration, opens the database, and serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Ironlog Server Binary
//!
//! Starts the training API with OIDC bearer authentication and a SQLite store.

use anyhow::Result;
use clap::Parser;
use ironlog_server::{config::environment::ServerConfig, database::Database, logging, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ironlog-server")]
#[command(about = "Ironlog - strength training programs, sessions, and set logs over HTTP")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Ironlog API");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url, config.database.max_connections).await?;

    if let Err(e) = server::run(config, database).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
