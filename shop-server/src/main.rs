//! shop-server binary
//!
//! Loads configuration, initializes logging and the database, then serves the
//! HTTP API until Ctrl-C.

use shop_server::logger::init_logger_with_file;
use shop_server::{AppState, Config, DbService, api};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::from_env()?;

    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    tracing::info!("Starting shop-server (env: {})", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: unset secrets fall back to built-in values");
    }

    let db = DbService::new(&config.database_path).await?;
    let state = AppState::new(&db, &config);
    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("shop-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.pool.close().await;
    tracing::info!("shop-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
