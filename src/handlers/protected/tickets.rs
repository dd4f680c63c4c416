// handlers/protected/tickets.rs - Ticket CRUD scoped to the authenticated caller

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Ticket;
use crate::handlers::utils::parse_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Deleted};
use crate::services::CreateTicketRequest;

/// GET /api/tickets - List the caller's tickets
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<Ticket>> {
    let tickets = state.tickets.list(&caller).await?;
    Ok(ApiResponse::success(tickets))
}

/// POST /api/tickets - Create a ticket owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Ticket> {
    let request: CreateTicketRequest = parse_body(payload)?;
    let ticket = state.tickets.create(&caller, request).await?;
    Ok(ApiResponse::created(ticket))
}

/// GET /api/tickets/:id - Fetch one of the caller's tickets
pub async fn fetch(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Ticket> {
    let ticket = state.tickets.fetch(&caller, &id).await?;
    Ok(ApiResponse::success(ticket))
}

/// PUT /api/tickets/:id - Overwrite product, description and/or status
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Ticket> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            // Unreadable body: access failures still take precedence
            state.tickets.fetch(&caller, &id).await?;
            return Err(rejection.into());
        }
    };
    let ticket = state.tickets.update(&caller, &id, body).await?;
    Ok(ApiResponse::success(ticket))
}

/// DELETE /api/tickets/:id - Permanently remove a ticket
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    state.tickets.delete(&caller, &id).await?;
    Ok(ApiResponse::success(Deleted::ok()))
}
