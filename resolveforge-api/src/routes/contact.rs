/// Contact form
///
/// ```text
/// POST /api/contact
/// {"name": "Jo", "email": "jo@example.co.uk", "message": "Do you cover Scotland?"}
/// ```
///
/// Messages are stored in `contact_messages` for the support inbox.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use resolveforge_shared::models::{
    contact::{ContactMessage, CreateContactMessage},
    normalize_email,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
}

impl ContactRequest {
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            message: self.message.trim().to_string(),
        }
    }
}

pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ContactResponse>> {
    let req = req.trimmed();
    req.validate()?;

    let stored = ContactMessage::create(
        &state.db,
        CreateContactMessage {
            name: req.name,
            email: req.email,
            message: req.message,
        },
    )
    .await?;

    tracing::info!(contact_id = %stored.id, "Contact message received");

    Ok(Json(ContactResponse { success: true }))
}
