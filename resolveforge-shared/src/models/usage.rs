/// Monthly usage counter model
///
/// One row per `(user_id, month)` counting metered analyses. Rows are created
/// lazily on the first admitted analysis of a month and only ever incremented.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE monthly_usage (
///     user_id UUID NOT NULL REFERENCES users(id),
///     month TEXT NOT NULL,                -- 'YYYY-MM', UTC
///     analyses_used INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, month)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Usage record for one user and one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MonthlyUsage {
    pub user_id: Uuid,

    /// Month key in `YYYY-MM` format
    pub month: String,

    /// Analyses consumed in this month
    pub analyses_used: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl MonthlyUsage {
    /// Gets the record for a user and month, if any
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        month: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyUsage>(
            r#"
            SELECT user_id, month, analyses_used, created_at, updated_at
            FROM monthly_usage
            WHERE user_id = $1 AND month = $2
            "#,
        )
        .bind(user_id)
        .bind(month)
        .fetch_optional(pool)
        .await
    }

    /// Gets the analyses used for a user and month (0 when no record exists)
    pub async fn analyses_used(
        pool: &PgPool,
        user_id: Uuid,
        month: &str,
    ) -> Result<i32, sqlx::Error> {
        let used = sqlx::query_scalar::<_, i32>(
            "SELECT analyses_used FROM monthly_usage WHERE user_id = $1 AND month = $2",
        )
        .bind(user_id)
        .bind(month)
        .fetch_optional(pool)
        .await?;

        Ok(used.unwrap_or(0))
    }

    /// Atomically increments the counter if it is below `cap`
    ///
    /// A single statement: inserts the row at 1 when absent, otherwise bumps
    /// it only while `analyses_used < cap`. The conflicting row is locked for
    /// the duration of the update, so concurrent callers for the same user
    /// and month serialise and the stored count can never pass `cap`.
    ///
    /// Returns the new count, or `None` when the cap was already reached
    /// (nothing is written in that case).
    pub async fn try_increment(
        pool: &PgPool,
        user_id: Uuid,
        month: &str,
        cap: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        if cap <= 0 {
            return Ok(None);
        }

        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO monthly_usage (user_id, month, analyses_used)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, month)
            DO UPDATE SET analyses_used = monthly_usage.analyses_used + 1,
                          updated_at = NOW()
            WHERE monthly_usage.analyses_used < $3
            RETURNING analyses_used
            "#,
        )
        .bind(user_id)
        .bind(month)
        .bind(cap)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's monthly records, most recent month first
    pub async fn history(
        pool: &PgPool,
        user_id: Uuid,
        months: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyUsage>(
            r#"
            SELECT user_id, month, analyses_used, created_at, updated_at
            FROM monthly_usage
            WHERE user_id = $1
            ORDER BY month DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(months)
        .fetch_all(pool)
        .await
    }
}
