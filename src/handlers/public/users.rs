use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::handlers::utils::parse_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthPayload, LoginRequest, RegisterRequest};

/// POST /api/users - Register a new account and return a bearer token
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<AuthPayload> {
    let request: RegisterRequest = parse_body(payload)?;
    let created = state.accounts.register(request).await?;
    Ok(ApiResponse::created(created))
}

/// POST /api/users/login - Exchange email and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<AuthPayload> {
    let request: LoginRequest = parse_body(payload)?;
    let session = state.accounts.login(request).await?;
    Ok(ApiResponse::success(session))
}
