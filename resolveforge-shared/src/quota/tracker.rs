/// Quota admission
///
/// [`QuotaTracker::check_and_consume`] is called once per metered request
/// before any expensive work. It resolves the caller's tier, derives the UTC
/// month key and either records the request or reports that the month's
/// allowance is used up.
///
/// Failure handling:
///
/// - Plan lookup fails, or the user has no account row: logged, and the
///   caller is treated as free tier. An error never grants unlimited use.
/// - Usage store fails: logged, and surfaced as
///   [`QuotaError::StorageUnavailable`] so callers can say "try again"
///   rather than "quota used".
/// - Limit reached is not an error; it is `UsageResult { allowed: false }`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::month::MonthKey;
use super::policy::{Limit, PlanTier, QuotaPolicy};
use super::store::{PlanDirectory, UsageStore};
use crate::models::usage::MonthlyUsage;

/// Quota tracker error
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// The usage store could not be read or written
    #[error("usage storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Outcome of a metered request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageResult {
    pub allowed: bool,

    /// Count after any increment made by this call
    pub used: u32,

    pub limit: Limit,

    pub month: MonthKey,
}

/// Read-only view of a user's usage for a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub used: u32,
    pub limit: Limit,
    pub remaining: Option<u32>,
    pub month: MonthKey,
    pub plan: String,
}

/// Enforces monthly analysis limits
#[derive(Clone)]
pub struct QuotaTracker {
    plans: Arc<dyn PlanDirectory>,
    usage: Arc<dyn UsageStore>,
    policy: QuotaPolicy,
}

impl QuotaTracker {
    pub fn new(plans: Arc<dyn PlanDirectory>, usage: Arc<dyn UsageStore>, policy: QuotaPolicy) -> Self {
        Self { plans, usage, policy }
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Admits and records one metered request in the current UTC month
    pub async fn check_and_consume(&self, user_id: Uuid) -> Result<UsageResult, QuotaError> {
        self.check_and_consume_at(user_id, Utc::now()).await
    }

    /// Same as [`check_and_consume`](Self::check_and_consume) at a given instant
    pub async fn check_and_consume_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<UsageResult, QuotaError> {
        let tier = self.resolve_tier(user_id).await;
        let limit = self.policy.limit_for(&tier);
        let month = MonthKey::from_datetime(now);

        let cap = match limit {
            Limit::Unlimited => {
                return Ok(UsageResult {
                    allowed: true,
                    used: 0,
                    limit,
                    month,
                });
            }
            Limit::Capped(cap) => cap,
        };

        let consumed = self
            .usage
            .try_consume(user_id, &month, cap)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, month = %month, error = %e, "Failed to record analysis usage");
                QuotaError::StorageUnavailable(e.to_string())
            })?;

        match consumed {
            Some(used) => {
                tracing::debug!(user_id = %user_id, month = %month, used, limit = cap, "Analysis admitted");
                Ok(UsageResult {
                    allowed: true,
                    used,
                    limit,
                    month,
                })
            }
            None => {
                // A refused increment already proves the count is at the cap
                let used = match self.usage.used(user_id, &month).await {
                    Ok(used) => used,
                    Err(e) => {
                        tracing::warn!(user_id = %user_id, month = %month, error = %e, "Failed to read usage after denial, reporting the cap");
                        cap
                    }
                };
                tracing::info!(user_id = %user_id, month = %month, used, limit = cap, "Monthly analysis limit reached");
                Ok(UsageResult {
                    allowed: false,
                    used,
                    limit,
                    month,
                })
            }
        }
    }

    /// Current month usage, without consuming anything
    pub async fn current_usage(&self, user_id: Uuid) -> Result<UsageSnapshot, QuotaError> {
        self.current_usage_at(user_id, Utc::now()).await
    }

    pub async fn current_usage_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<UsageSnapshot, QuotaError> {
        let tier = self.resolve_tier(user_id).await;
        let limit = self.policy.limit_for(&tier);
        let month = MonthKey::from_datetime(now);
        let used = self.read_used(user_id, &month).await?;

        Ok(UsageSnapshot {
            used,
            limit,
            remaining: limit.remaining(used),
            month,
            plan: tier.as_str().to_string(),
        })
    }

    /// Past monthly records, most recent first
    pub async fn history(&self, user_id: Uuid, months: u32) -> Result<Vec<MonthlyUsage>, QuotaError> {
        self.usage.history(user_id, months).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to load usage history");
            QuotaError::StorageUnavailable(e.to_string())
        })
    }

    async fn read_used(&self, user_id: Uuid, month: &MonthKey) -> Result<u32, QuotaError> {
        self.usage.used(user_id, month).await.map_err(|e| {
            tracing::error!(user_id = %user_id, month = %month, error = %e, "Failed to read analysis usage");
            QuotaError::StorageUnavailable(e.to_string())
        })
    }

    async fn resolve_tier(&self, user_id: Uuid) -> PlanTier {
        match self.plans.plan_for(user_id).await {
            Ok(Some(plan)) => PlanTier::parse(&plan),
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "No account found for quota check, applying free tier");
                PlanTier::Free
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Plan lookup failed, applying free tier");
                PlanTier::Free
            }
        }
    }
}
