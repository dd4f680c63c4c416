// handlers/public/mod.rs - Handlers that need no bearer token

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

pub mod users;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Support Desk API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "users": "/api/users, /api/users/login (public), /api/users/me (protected)",
            "tickets": "/api/tickets[/:id] (protected)",
        }
    }))
}

/// GET /health - Liveness plus a store round-trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
