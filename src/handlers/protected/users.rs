use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/users/me - Account behind the bearer token
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Account> {
    let account = state.accounts.me(caller.user_id).await?;
    Ok(ApiResponse::success(account))
}
