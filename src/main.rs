mod models;
mod handlers;
mod services;
mod middleware;
mod config;
mod errors;
mod state;
mod routes;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use crate::{
    config::Config,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Using task store {} and user store {}",
        config.storage.task_file,
        config.storage.user_file
    );

    let state = AppState::from_config(config.clone()).context("Failed to initialise assistant client")?;
    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
