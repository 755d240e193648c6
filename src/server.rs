// ABOUTME: HTTP server startup: token verifier selection, listener, and graceful shutdown
// ABOUTME: Spawns the scheduled JWKS refresh and serves the router until SIGINT or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::identity::{OidcVerifier, RejectAllVerifier, TokenVerifier};
use crate::resources::ServerResources;
use crate::routes::build_router;

/// Pick the token verifier for this configuration
///
/// Returns the verifier plus the scheduled JWKS refresh task when an identity
/// provider is configured. Without one every bearer token is rejected, which
/// `ServerConfig::validate` only permits outside production.
pub fn select_verifier(config: &ServerConfig) -> (Arc<dyn TokenVerifier>, Option<JoinHandle<()>>) {
    match OidcVerifier::from_config(&config.identity) {
        Some(verifier) => {
            let refresh = verifier
                .key_cache()
                .spawn_scheduled_refresh(config.identity.refresh_interval());
            info!(jwks_url = verifier.key_cache().url(), "OIDC token verification enabled");
            (Arc::new(verifier), Some(refresh))
        }
        None => {
            warn!("No identity provider configured; rejecting all bearer tokens");
            (Arc::new(RejectAllVerifier), None)
        }
    }
}

/// Serve the API until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn run(config: ServerConfig, database: Database) -> Result<()> {
    let (verifier, refresh_task) = select_verifier(&config);
    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, verifier, config));
    let app = build_router(resources);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(task) = refresh_task {
        task.abort();
    }
    info!("HTTP server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
