/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `ApiResult<T>`; library errors convert with `?`.
///
/// Every error body has the shape `{error, message, details?}`. A denied
/// analysis additionally carries the usage figures the dashboard shows.
///
/// # Example
///
/// ```no_run
/// use resolveforge_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(text: String) -> ApiResult<Json<serde_json::Value>> {
///     if text.trim().is_empty() {
///         return Err(ApiError::BadRequest("Missing or invalid 'text' field.".to_string()));
///     }
///     Ok(Json(json!({ "received": text.len() })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use resolveforge_shared::analysis::AnalysisError;
use resolveforge_shared::auth::middleware::AuthError;
use resolveforge_shared::auth::password::PasswordError;
use resolveforge_shared::auth::session::SessionError;
use resolveforge_shared::quota::{Limit, MonthKey, QuotaError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. an account that already has a password
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Monthly analysis allowance used up (429)
    QuotaExceeded {
        used: u32,
        limit: Limit,
        month: MonthKey,
    },

    /// Internal server error (500)
    InternalError(String),

    /// Upstream returned something unusable (502)
    BadGateway(String),

    /// Service unavailable (503), retrying later may help
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "quota_exceeded")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

/// Body of a 429 response
#[derive(Debug, Serialize)]
struct QuotaExceededResponse {
    error: &'static str,
    message: String,
    used: u32,
    limit: Limit,
    month: MonthKey,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::QuotaExceeded { used, limit, month } => {
                write!(f, "Quota exceeded: {}/{} analyses in {}", used, limit, month)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

fn quota_exceeded_response(used: u32, limit: Limit, month: MonthKey) -> Response {
    let body = Json(QuotaExceededResponse {
        error: "quota_exceeded",
        message: format!(
            "You've used your {} analyses for {}. Higher tiers are on the way.",
            limit,
            month.label()
        ),
        used,
        limit,
        month,
    });

    (StatusCode::TOO_MANY_REQUESTS, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg, None),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
            ApiError::QuotaExceeded { used, limit, month } => {
                return quota_exceeded_response(used, limit, month);
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                tracing::error!("Database unreachable: {}", err);
                ApiError::ServiceUnavailable("Database temporarily unavailable. Please try again.".to_string())
            }
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// A usage store outage is retryable and must not read as "quota used"
impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::StorageUnavailable(_) => ApiError::ServiceUnavailable(
                "We couldn't check your usage right now. Please try again in a moment.".to_string(),
            ),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidJson(_) => {
                ApiError::BadGateway("AI returned invalid JSON. Please try again.".to_string())
            }
            AnalysisError::EmptyResponse => ApiError::BadGateway("No content returned from AI.".to_string()),
            other => {
                tracing::error!("Analysis failed: {}", other);
                ApiError::ServiceUnavailable("Failed to analyse issue. Please try again later.".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CreateError(msg) => {
                ApiError::InternalError(format!("Session creation failed: {}", msg))
            }
            other => AuthError::from(other).into(),
        }
    }
}

/// Convert validator errors into field-level details
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
