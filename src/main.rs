use std::sync::Arc;

use rider_dispatch::api;
use rider_dispatch::config::Config;
use rider_dispatch::error::AppError;
use rider_dispatch::state::AppState;
use rider_dispatch::store::{MemoryStore, Store, seed};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    if let Some(path) = &config.seed_path {
        seed::load_seed_file(path, store.as_ref())?;
    }

    let shared_state = Arc::new(AppState::new(
        store,
        config.dispatch,
        config.event_buffer_size,
    ));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        online_window_secs = config.dispatch.online_window_secs,
        average_speed_kmh = config.dispatch.average_speed_kmh,
        "http server started"
    );

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
