/// User model and database operations
///
/// Users are identified by a UUID and a unique, normalised email address.
/// The `plan` column decides how the quota tracker meters analyses.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     plan TEXT NOT NULL DEFAULT 'free',
///     password_hash TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use resolveforge_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if let Some(user) = User::find_by_email(&pool, "user@example.co.uk").await? {
///     println!("{} is on the {} plan", user.email, user.plan);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Plan assigned to new accounts
pub const DEFAULT_PLAN: &str = "free";

const USER_COLUMNS: &str =
    "id, email, plan, password_hash, created_at, updated_at, last_login_at";

/// User account
///
/// `password_hash` is an Argon2id PHC string. It is `None` for legacy
/// accounts created by the old passwordless login.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Normalised (trimmed, lowercase) email address
    pub email: String,

    /// Plan tier name, e.g. "free"
    pub plan: String,

    /// Argon2id password hash, never serialised
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account has a password credential attached
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address, expected to be normalised by the caller
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: Option<String>,

    /// Plan tier, defaults to "free"
    pub plan: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error with SQLSTATE 23505 if the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, plan) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.plan.unwrap_or_else(|| DEFAULT_PLAN.to_string()))
            .fetch_one(pool)
            .await
    }

    /// Creates the user unless the email already exists
    ///
    /// Returns the account and whether it was created by this call. Two
    /// concurrent first logins for the same email both end up with the same row.
    pub async fn find_or_create(
        pool: &PgPool,
        data: CreateUser,
    ) -> Result<(Self, bool), sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, plan)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let inserted = sqlx::query_as::<_, User>(&query)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(data.plan.as_deref().unwrap_or(DEFAULT_PLAN))
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(user) => Ok((user, true)),
            None => {
                let existing = Self::find_by_email(pool, &data.email)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((existing, false))
            }
        }
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by normalised email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Reads only the plan column for a user
    ///
    /// Returns `None` if no such user exists.
    pub async fn find_plan(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT plan FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Attaches a password to a legacy passwordless account
    ///
    /// Only succeeds while `password_hash` is still NULL, so an existing
    /// credential can never be overwritten through this path. Returns `None`
    /// if the user does not exist or already has a password.
    pub async fn claim_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND password_hash IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(pool)
            .await
    }

    /// Changes the plan tier of a user
    pub async fn update_plan(pool: &PgPool, id: Uuid, plan: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET plan = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(plan)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(password_hash: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.co.uk".to_string(),
            plan: DEFAULT_PLAN.to_string(),
            password_hash: password_hash.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user(Some("$argon2id$secret"));
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["plan"], "free");
    }

    #[test]
    fn test_has_password() {
        assert!(sample_user(Some("$argon2id$x")).has_password());
        assert!(!sample_user(None).has_password());
    }
}
