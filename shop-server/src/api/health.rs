//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database probe failed");
            "unavailable"
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "service": "shop-server",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
