/// Early-access mailing list sign-ups
///
/// Insert-only. The email column is unique; signing up twice is not an error
/// for the caller, see [`EarlyAccessSignup::register`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::is_unique_violation;

/// Default source tag for sign-ups from the landing page
pub const DEFAULT_SOURCE: &str = "hero_button";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarlyAccessSignup {
    pub id: Uuid,
    pub email: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a sign-up attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Added,
    AlreadyListed,
}

impl EarlyAccessSignup {
    /// Adds an email to the list
    ///
    /// A unique violation means the address is already listed and is
    /// reported as [`SignupOutcome::AlreadyListed`].
    pub async fn register(
        pool: &PgPool,
        email: &str,
        source: &str,
    ) -> Result<SignupOutcome, sqlx::Error> {
        let result = sqlx::query("INSERT INTO early_access_signups (email, source) VALUES ($1, $2)")
            .bind(email)
            .bind(source)
            .execute(pool)
            .await;

        match result {
            Ok(_) => Ok(SignupOutcome::Added),
            Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::AlreadyListed),
            Err(err) => Err(err),
        }
    }
}
