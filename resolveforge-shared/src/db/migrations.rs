/// Database migration runner
///
/// Migrations are embedded at compile time from `resolveforge-shared/migrations/`.
/// Each file is a forward-only `{timestamp}_{name}.sql` script.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the connection drops
/// mid-run. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Number of migrations embedded in this build
pub fn embedded_migration_count() -> usize {
    sqlx::migrate!("./migrations").iter().count()
}

/// Creates the database if it doesn't exist (development convenience)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_migrations_embedded() {
        assert_eq!(embedded_migration_count(), 4);
    }
}
