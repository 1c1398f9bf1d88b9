/// Database models for ResolveForge
///
/// # Models
///
/// - `user`: Accounts, plan tier and password credential
/// - `usage`: Monthly usage counters for metered analyses
/// - `claim`: Saved complaint analyses shown on the dashboard
/// - `early_access`: Early-access mailing list sign-ups
/// - `contact`: Contact form messages
///
/// # Example
///
/// ```no_run
/// use resolveforge_shared::models::user::{CreateUser, User};
/// use resolveforge_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "user@example.co.uk".to_string(),
///         password_hash: Some("$argon2id$...".to_string()),
///         plan: None,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod claim;
pub mod contact;
pub mod early_access;
pub mod usage;
pub mod user;

/// Postgres SQLSTATE for unique constraint violations
pub const UNIQUE_VIOLATION: &str = "23505";

/// Returns true when `err` is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Trims and lowercases an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
