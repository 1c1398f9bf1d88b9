/// Storage seams for the quota tracker
///
/// The tracker needs two things from storage: a user's plan, and a usage
/// counter per `(user, month)` with an atomic increment-with-ceiling. Both
/// are traits so the tracker can run against PostgreSQL in production and
/// [`InMemoryStore`](super::InMemoryStore) in tests.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::month::MonthKey;
use crate::models::usage::MonthlyUsage;
use crate::models::user::User;

/// Error from a plan or usage store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Looks up a user's plan
#[async_trait]
pub trait PlanDirectory: Send + Sync {
    /// Stored plan string, or `None` if the user does not exist
    async fn plan_for(&self, user_id: Uuid) -> Result<Option<String>, StoreError>;
}

/// Monthly usage counters
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Analyses recorded for the month (0 when there is no record)
    async fn used(&self, user_id: Uuid, month: &MonthKey) -> Result<u32, StoreError>;

    /// Increments the counter if it is below `cap`, atomically
    ///
    /// Returns the new count, or `None` if the counter was already at or
    /// above `cap`, in which case nothing is written. A missing record counts
    /// as zero and is created at 1.
    async fn try_consume(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        cap: u32,
    ) -> Result<Option<u32>, StoreError>;

    /// Most recent `months` records for the user, newest first
    async fn history(&self, user_id: Uuid, months: u32) -> Result<Vec<MonthlyUsage>, StoreError>;
}

fn to_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// [`PlanDirectory`] backed by the `users` table
#[derive(Debug, Clone)]
pub struct PgPlanDirectory {
    pool: PgPool,
}

impl PgPlanDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanDirectory for PgPlanDirectory {
    async fn plan_for(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        Ok(User::find_plan(&self.pool, user_id).await?)
    }
}

/// [`UsageStore`] backed by the `monthly_usage` table
#[derive(Debug, Clone)]
pub struct PgUsageStore {
    pool: PgPool,
}

impl PgUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn used(&self, user_id: Uuid, month: &MonthKey) -> Result<u32, StoreError> {
        let used = MonthlyUsage::analyses_used(&self.pool, user_id, &month.to_string()).await?;
        Ok(to_count(used))
    }

    async fn try_consume(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        cap: u32,
    ) -> Result<Option<u32>, StoreError> {
        let cap = i32::try_from(cap).unwrap_or(i32::MAX);
        let count = MonthlyUsage::try_increment(&self.pool, user_id, &month.to_string(), cap).await?;
        Ok(count.map(to_count))
    }

    async fn history(&self, user_id: Uuid, months: u32) -> Result<Vec<MonthlyUsage>, StoreError> {
        Ok(MonthlyUsage::history(&self.pool, user_id, i64::from(months)).await?)
    }
}
