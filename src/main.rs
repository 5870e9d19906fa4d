//! NoteHub front end - browse notes by tag and create new ones.
//!
//! This is the main entry point for the web server.
//! The application is organized into the following modules:
//!
//! - `models`: Notes, tags and list pages
//! - `api`: Client for the remote NoteHub API
//! - `cache`: Query cache with prefix invalidation and hydration
//! - `prefetch`: Server-side prefetch of the filtered list
//! - `form`: Note form validation and submit state machine
//! - `templates`: HTML/CSS templates and rendering
//! - `handlers`: HTTP route handlers

use anyhow::{Context, Result};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use notehub::{app, config::Config, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notehub=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let state = Arc::new(AppState::from_config(&config).context("Failed to build API client")?);

    let router = app(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(address = %config.bind, "NoteHub front end running");
    info!(api = %config.api_url, token = config.api_token.is_some(), "Using NoteHub API");

    axum::serve(listener, router).await.context("Server error")?;
    Ok(())
}
