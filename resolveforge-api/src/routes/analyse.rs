/// Complaint analysis endpoint
///
/// ```text
/// POST /api/analyse
/// {"text": "I bought a kettle three weeks ago and it has stopped working..."}
/// ```
///
/// Order of operations:
///
/// 1. Reject a missing or blank `text` (400) without touching the quota.
/// 2. Admit and record the request against the monthly quota (429 when the
///    allowance is used up, 503 when usage storage is down).
/// 3. Ask the analyser for the issue type, rights summary and letter.
/// 4. Save the result as a draft claim. A failed save is logged; the user
///    still gets their letter.
///
/// The analysis is counted once admitted, even if the model call then fails.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use resolveforge_shared::{
    analysis::Analysis,
    auth::middleware::AuthContext,
    models::claim::{Claim, CreateClaim},
    quota::UsageResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AnalyseRequest {
    /// Complaint text; anything other than a string is rejected
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct AnalyseResponse {
    #[serde(flatten)]
    pub analysis: Analysis,

    /// Saved claim, absent if saving failed
    pub claim_id: Option<Uuid>,

    pub usage: UsageResult,
}

pub async fn analyse(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<AnalyseRequest>,
) -> ApiResult<Json<AnalyseResponse>> {
    let text = req
        .text
        .as_ref()
        .and_then(|value| value.as_str())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing or invalid 'text' field.".to_string()))?;

    let usage = state.quota.check_and_consume(auth.user_id).await?;
    if !usage.allowed {
        return Err(ApiError::QuotaExceeded {
            used: usage.used,
            limit: usage.limit,
            month: usage.month,
        });
    }

    let analysis = state.analyser.analyse(&text).await?;

    let claim = Claim::create(
        &state.db,
        CreateClaim {
            user_id: Some(auth.user_id),
            raw_text: text,
            issue_type: analysis.issue_type.clone(),
            summary: analysis.summary.clone(),
            letter: analysis.letter.clone(),
        },
    )
    .await;

    let claim_id = match claim {
        Ok(claim) => Some(claim.id),
        Err(e) => {
            tracing::error!(user_id = %auth.user_id, error = %e, "Failed to save claim");
            None
        }
    };

    tracing::info!(
        user_id = %auth.user_id,
        issue_type = %analysis.issue_type,
        used = usage.used,
        "Complaint analysed"
    );

    Ok(Json(AnalyseResponse {
        analysis,
        claim_id,
        usage,
    }))
}
