//! # Crest Checkout API
//!
//! Binary entry point: wires configuration, the price catalog, the audit
//! store, and the payment gateway into the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crest_audit::{AuditDbConfig, SqliteAuditSink};
use crest_core::PriceCatalog;

use crest_checkout_api::config::ApiConfig;
use crest_checkout_api::gateway::StripeGateway;
use crest_checkout_api::routes;
use crest_checkout_api::service::CheckoutService;
use crest_checkout_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Crest Checkout API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(port = config.http_port, "Configuration loaded");

    // Build the price catalog: configuration file when provided, built-in
    // production dataset otherwise. Immutable from here on.
    let catalog = match &config.catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let catalog = PriceCatalog::from_json(&json)?;
            info!(%path, "Price catalog loaded from configuration");
            catalog
        }
        None => PriceCatalog::builtin(),
    };
    let catalog = Arc::new(catalog);

    // Open the incident store
    let audit = SqliteAuditSink::connect(AuditDbConfig::new(&config.audit_database_path)).await?;
    info!(path = %config.audit_database_path, "Audit store connected");

    // Payment gateway client
    let gateway = StripeGateway::new(config.gateway_secret_key.clone());

    // Wire shared state
    let service = CheckoutService::new(
        Arc::clone(&catalog),
        Arc::new(gateway),
        Arc::new(audit),
        config.base_url.clone(),
    );
    let state = Arc::new(AppState {
        service,
        config: config.clone(),
    });

    // Serve
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "Failed to install shutdown handler");
    }
    info!("Shutdown signal received");
}
