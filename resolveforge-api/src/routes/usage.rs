/// Usage endpoints
///
/// - `GET /api/usage` - This month's analyses used, limit and remaining
/// - `GET /api/usage/history?months=N` - Past monthly records, newest first

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use resolveforge_shared::{auth::middleware::AuthContext, quota::UsageSnapshot};
use serde::{Deserialize, Serialize};

const DEFAULT_HISTORY_MONTHS: u32 = 12;
const MAX_HISTORY_MONTHS: u32 = 36;

/// Current usage with a display label for the month
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    #[serde(flatten)]
    pub snapshot: UsageSnapshot,

    /// e.g. "November 2025"
    pub month_label: String,
}

impl From<UsageSnapshot> for UsageResponse {
    fn from(snapshot: UsageSnapshot) -> Self {
        Self {
            month_label: snapshot.month.label(),
            snapshot,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub months: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub month: String,
    pub analyses_used: i32,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub months: Vec<HistoryEntry>,
}

/// Current month's usage; never consumes an analysis
pub async fn current(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UsageResponse>> {
    let snapshot = state.quota.current_usage(auth.user_id).await?;
    Ok(Json(snapshot.into()))
}

/// Monthly usage history
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let months = query
        .months
        .unwrap_or(DEFAULT_HISTORY_MONTHS)
        .clamp(1, MAX_HISTORY_MONTHS);

    let records = state.quota.history(auth.user_id, months).await?;

    Ok(Json(HistoryResponse {
        months: records
            .into_iter()
            .map(|record| HistoryEntry {
                month: record.month,
                analyses_used: record.analyses_used,
            })
            .collect(),
    }))
}
