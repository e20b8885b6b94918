use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::store::{Store, WorkoutStore};

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = match &state.store {
        Store::Sqlite(_) => "sqlite",
        Store::Memory(_) => "memory",
    };

    match state.store.list_all().await {
        Ok(workouts) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "store": backend,
                "workouts": workouts.len()
            })),
        ),
        Err(e) => {
            tracing::error!("Health check could not reach the store: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "version": env!("CARGO_PKG_VERSION"),
                    "store": backend
                })),
            )
        }
    }
}
