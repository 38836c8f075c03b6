use std::sync::Arc;

use ride_matcher::api;
use ride_matcher::config::Config;
use ride_matcher::error::AppError;
use ride_matcher::observability::logging;
use ride_matcher::state::AppState;
use ride_matcher::store::{seed, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    logging::init(&config.log_level, &config.log_format);

    let store = MemoryStore::new();
    if let Some(path) = &config.seed_file {
        seed::load_file(&store, path)?;
    }

    let shared_state = Arc::new(AppState::new(store));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
