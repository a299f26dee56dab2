//! HTTP server initialization and runtime setup.
//!
//! Handles session store selection, feedback configuration, and the Axum
//! server lifecycle.

use crate::application::SubmitFeedback;
use crate::config::Config;
use crate::infrastructure::session::{MemorySessionStore, RedisSessionStore, SessionStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Session store (Redis, or in-memory fallback)
/// - Feedback settings and the notification client
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - The feedback config file is unreadable or invalid
/// - The Notify API key is malformed
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let sessions = connect_sessions(&config).await;

    let feedback_config = config.load_feedback_config()?;
    if feedback_config.is_none() {
        tracing::warn!("No FEEDBACK_CONFIG set, feedback will not be emailed");
    }
    let submit = SubmitFeedback::new(feedback_config, &config.notify_base_url)
        .context("Failed to create notification client")?;

    let state = AppState::new(&config, sessions, submit);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn connect_sessions(config: &Config) -> Arc<dyn SessionStore> {
    if let Some(redis_url) = &config.redis_url {
        match RedisSessionStore::connect(redis_url, config.session_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Sessions enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-memory sessions.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Sessions in memory");
    }
    Arc::new(MemorySessionStore::new(config.session_ttl_seconds))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
