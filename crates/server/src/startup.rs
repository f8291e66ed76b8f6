//! Process startup shared by the server binary and the CLI

use crate::config::{ServerConfig, ServiceKind};
use crate::page::Page;
use crate::routes::{analysis_router, page_router, AppState};
use anyhow::{Context, Result};
use axum::Router;
use llm_bridge::PavementAnalyzer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr; `RUST_LOG` overrides the default `info` level
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Build the router for the configured service
pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let page = Page::load(config.page_path.as_deref())?;

    let app = match config.kind {
        ServiceKind::Analysis => {
            let analyzer = PavementAnalyzer::from_config(config.groq_config())?
                .with_sanitize(config.sanitize);
            analysis_router(AppState::new(Arc::new(analyzer), page), config.max_body_bytes)
        }
        ServiceKind::Page => page_router(page),
    };

    Ok(app)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    tracing::info!(
        service = %config.kind,
        credential_source = %config.credential.source,
        model = %config.groq_model,
        sanitize = config.sanitize,
        "Starting WalkSafe service"
    );

    let app = build_app(&config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
