/// Session tokens
///
/// A session is an HS256-signed JWT carried in the `resolveforge_session`
/// cookie (or an `Authorization: Bearer` header for API clients). Sessions are
/// long-lived, one year by default, and are not stored server side.
///
/// # Example
///
/// ```
/// use resolveforge_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-session-secret-of-at-least-32-bytes!!";
/// let user_id = Uuid::new_v4();
///
/// let token = create_session_token(&SessionClaims::new(user_id, "jo@example.co.uk", 365), secret)?;
/// let claims = validate_session_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every session token
pub const SESSION_ISSUER: &str = "resolveforge";

/// Default session lifetime in days
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 365;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    #[error("Session has expired")]
    Expired,

    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: Uuid,

    /// Normalised email at the time of login
    pub email: String,

    pub iss: String,

    pub iat: i64,

    pub nbf: i64,

    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims valid from now for `ttl_days`
    pub fn new(user_id: Uuid, email: impl Into<String>, ttl_days: i64) -> Self {
        Self::with_expiration(user_id, email, Duration::days(ttl_days))
    }

    pub fn with_expiration(user_id: Uuid, email: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email: email.into(),
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Signs session claims with the server secret
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| SessionError::CreateError(e.to_string()))
}

/// Verifies a session token's signature, issuer and validity window
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        })
}
