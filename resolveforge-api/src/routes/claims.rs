/// Claims dashboard endpoints
///
/// - `GET /api/claims` - The caller's claims, newest first, with this month's usage
/// - `GET /api/claims/:id` - One claim including the letter

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::usage::UsageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use resolveforge_shared::{
    auth::middleware::AuthContext,
    models::claim::{Claim, ClaimSummary},
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ClaimsResponse {
    pub claims: Vec<ClaimSummary>,
    pub usage: UsageResponse,
}

pub async fn list_claims(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ClaimsResponse>> {
    let usage = state.quota.current_usage(auth.user_id).await?;
    let claims = Claim::list_by_user(&state.db, auth.user_id).await?;

    Ok(Json(ClaimsResponse {
        claims,
        usage: usage.into(),
    }))
}

/// Claims owned by someone else are reported as not found
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Claim>> {
    Claim::find_for_user(&state.db, id, auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Claim not found".to_string()))
}
