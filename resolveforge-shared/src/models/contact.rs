/// Contact form messages
///
/// Messages are stored for follow-up by the support inbox; delivery by email
/// happens outside this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a new contact message (already trimmed and validated)
#[derive(Debug, Clone)]
pub struct CreateContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub async fn create(pool: &PgPool, data: CreateContactMessage) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, message, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.message)
        .fetch_one(pool)
        .await
    }
}
