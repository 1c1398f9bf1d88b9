/// Early-access mailing list
///
/// ```text
/// POST /api/early-access
/// {"email": "jo@example.co.uk", "source": "hero_button"}
/// ```
///
/// Joining twice is not an error; the second call gets a friendly
/// "already on the list" message.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use resolveforge_shared::models::{
    early_access::{EarlyAccessSignup, SignupOutcome, DEFAULT_SOURCE},
    normalize_email,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct EarlyAccessRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(max = 64, message = "Source must be at most 64 characters"))]
    pub source: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EarlyAccessResponse {
    pub success: bool,
    pub message: String,
}

pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<EarlyAccessRequest>,
) -> ApiResult<Json<EarlyAccessResponse>> {
    let req = EarlyAccessRequest {
        email: normalize_email(&req.email),
        source: req
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    req.validate()?;

    let source = req.source.as_deref().unwrap_or(DEFAULT_SOURCE);
    let outcome = EarlyAccessSignup::register(&state.db, &req.email, source).await?;

    let message = match outcome {
        SignupOutcome::Added => {
            tracing::info!(source = %source, "Early-access signup");
            "Thanks! You're on the early-access list."
        }
        SignupOutcome::AlreadyListed => "You're already on the list. We'll be in touch soon.",
    };

    Ok(Json(EarlyAccessResponse {
        success: true,
        message: message.to_string(),
    }))
}
