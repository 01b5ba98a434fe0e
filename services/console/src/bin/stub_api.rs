//! services/console/src/bin/stub_api.rs
//!
//! Runs the in-memory stub API locally, seeded with one administrator, so the
//! console can be pointed at it through `API_ROOT`.

use console_lib::{
    config::StubConfig,
    error::ConsoleError,
    stub::{self, rest::ApiDoc, StubState},
};
use ledgerdesk_core::domain::Role;
use axum::Router;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = StubConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting stub API...");

    // --- 2. Seed the Administrator ---
    let state = StubState::new()
        .with_user(&config.admin_email, &config.admin_password, Role::Admin)?;
    info!("Seeded administrator {}", config.admin_email);

    // --- 3. Build the Router ---
    let app = Router::new()
        .merge(stub::router(Arc::new(state)))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 4. Shut Down on Ctrl-C ---
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
        }
        info!("Shutting down stub API");
        trigger.cancel();
    });

    // --- 5. Start the Server ---
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    stub::serve(listener, app, shutdown).await?;

    Ok(())
}
