/// In-process plan and usage store
///
/// Implements both [`PlanDirectory`] and [`UsageStore`] over maps guarded by
/// a `tokio::sync::Mutex`. `try_consume` reads, compares and writes under one
/// guard, which gives the same ceiling guarantee as the PostgreSQL statement.
/// Used by tests and for running the API without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::month::MonthKey;
use super::store::{PlanDirectory, StoreError, UsageStore};
use crate::models::usage::MonthlyUsage;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    plans: Mutex<HashMap<Uuid, String>>,
    usage: Mutex<HashMap<(Uuid, MonthKey), MonthlyUsage>>,
    fail_plan_lookups: AtomicBool,
    fail_usage: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or changes) a user's plan
    pub async fn set_plan(&self, user_id: Uuid, plan: impl Into<String>) {
        self.plans.lock().await.insert(user_id, plan.into());
    }

    /// Stored count for a month, `None` when no record exists
    pub async fn stored(&self, user_id: Uuid, month: &MonthKey) -> Option<u32> {
        self.usage
            .lock()
            .await
            .get(&(user_id, *month))
            .map(|record| u32::try_from(record.analyses_used).unwrap_or(0))
    }

    /// Number of usage records across all users
    pub async fn record_count(&self) -> usize {
        self.usage.lock().await.len()
    }

    /// Makes plan lookups fail until reset
    pub fn set_plan_lookups_failing(&self, failing: bool) {
        self.fail_plan_lookups.store(failing, Ordering::SeqCst);
    }

    /// Makes every usage read and write fail until reset
    pub fn set_usage_failing(&self, failing: bool) {
        self.fail_usage.store(failing, Ordering::SeqCst);
    }

    fn check_usage_available(&self) -> Result<(), StoreError> {
        if self.fail_usage.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("usage store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlanDirectory for InMemoryStore {
    async fn plan_for(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        if self.fail_plan_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("plan directory offline".to_string()));
        }
        Ok(self.plans.lock().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl UsageStore for InMemoryStore {
    async fn used(&self, user_id: Uuid, month: &MonthKey) -> Result<u32, StoreError> {
        self.check_usage_available()?;
        Ok(self.stored(user_id, month).await.unwrap_or(0))
    }

    async fn try_consume(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        cap: u32,
    ) -> Result<Option<u32>, StoreError> {
        self.check_usage_available()?;

        let mut usage = self.usage.lock().await;
        let current = usage
            .get(&(user_id, *month))
            .map(|record| u32::try_from(record.analyses_used).unwrap_or(0))
            .unwrap_or(0);

        if current >= cap {
            return Ok(None);
        }

        // Let other tasks run while the guard is held
        tokio::task::yield_now().await;

        let now = Utc::now();
        let record = usage.entry((user_id, *month)).or_insert_with(|| MonthlyUsage {
            user_id,
            month: month.to_string(),
            analyses_used: 0,
            created_at: now,
            updated_at: now,
        });
        record.analyses_used += 1;
        record.updated_at = now;

        Ok(Some(current + 1))
    }

    async fn history(&self, user_id: Uuid, months: u32) -> Result<Vec<MonthlyUsage>, StoreError> {
        self.check_usage_available()?;

        let usage = self.usage.lock().await;
        let mut records: Vec<(MonthKey, MonthlyUsage)> = usage
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|((_, month), record)| (*month, record.clone()))
            .collect();
        records.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(records
            .into_iter()
            .take(months as usize)
            .map(|(_, record)| record)
            .collect())
    }
}
