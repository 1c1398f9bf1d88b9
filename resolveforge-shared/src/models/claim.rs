/// Claim model: a saved complaint analysis
///
/// Every successful analysis is stored as a `draft` claim so it shows up on
/// the user's dashboard.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE claims (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID REFERENCES users(id),
///     raw_text TEXT NOT NULL,
///     issue_type TEXT NOT NULL,
///     summary TEXT NOT NULL,
///     letter TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'draft',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Claim lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Letter generated, not yet sent
    Draft,
    /// User reports the letter was sent
    Sent,
    /// Issue resolved
    Resolved,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Sent => "sent",
            ClaimStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ClaimStatus::Draft),
            "sent" => Some(ClaimStatus::Sent),
            "resolved" => Some(ClaimStatus::Resolved),
            _ => None,
        }
    }
}

/// Full claim record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Claim {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub raw_text: String,
    pub issue_type: String,
    pub summary: String,
    pub letter: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Dashboard row (no letter or raw text)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClaimSummary {
    pub id: Uuid,
    pub issue_type: String,
    pub summary: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Input for saving a new claim
#[derive(Debug, Clone)]
pub struct CreateClaim {
    pub user_id: Option<Uuid>,
    pub raw_text: String,
    pub issue_type: String,
    pub summary: String,
    pub letter: String,
}

impl Claim {
    /// Saves a new claim in `draft` status
    pub async fn create(pool: &PgPool, data: CreateClaim) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Claim>(
            r#"
            INSERT INTO claims (user_id, raw_text, issue_type, summary, letter, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, raw_text, issue_type, summary, letter, status, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.raw_text)
        .bind(data.issue_type)
        .bind(data.summary)
        .bind(data.letter)
        .bind(ClaimStatus::Draft.as_str())
        .fetch_one(pool)
        .await
    }

    /// Finds a claim owned by `user_id`
    ///
    /// Claims belonging to other users are reported as missing.
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Claim>(
            r#"
            SELECT id, user_id, raw_text, issue_type, summary, letter, status, created_at
            FROM claims
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's claims, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ClaimSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClaimSummary>(
            r#"
            SELECT id, issue_type, summary, status, created_at
            FROM claims
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
