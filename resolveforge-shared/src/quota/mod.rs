/// Monthly analysis quota
///
/// Free-tier accounts may run a fixed number of complaint analyses per
/// calendar month (UTC). Paid tiers are unlimited unless a cap is configured
/// for them. The tracker admits or denies each metered request and records
/// admitted ones with a single atomic increment-with-ceiling, so concurrent
/// requests from one user can never push the stored count past the cap.
///
/// # Modules
///
/// - [`month`]: `YYYY-MM` month keys
/// - [`policy`]: plan tiers and their limits
/// - [`store`]: plan and usage storage traits plus the PostgreSQL backends
/// - [`memory`]: in-process store for tests and local runs
/// - [`tracker`]: [`QuotaTracker`], the admission entry point
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use resolveforge_shared::quota::{PgPlanDirectory, PgUsageStore, QuotaPolicy, QuotaTracker};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let tracker = QuotaTracker::new(
///     Arc::new(PgPlanDirectory::new(pool.clone())),
///     Arc::new(PgUsageStore::new(pool)),
///     QuotaPolicy::default(),
/// );
///
/// let result = tracker.check_and_consume(user_id).await?;
/// if !result.allowed {
///     println!("Used {} of {} analyses in {}", result.used, result.limit, result.month);
/// }
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod month;
pub mod policy;
pub mod store;
pub mod tracker;

pub use memory::InMemoryStore;
pub use month::{MonthKey, MonthKeyError};
pub use policy::{Limit, PlanTier, QuotaPolicy, FREE_TIER_MONTHLY_LIMIT};
pub use store::{PgPlanDirectory, PgUsageStore, PlanDirectory, StoreError, UsageStore};
pub use tracker::{QuotaError, QuotaTracker, UsageResult, UsageSnapshot};
