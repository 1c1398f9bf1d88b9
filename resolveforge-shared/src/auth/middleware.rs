/// Session authentication for Axum
///
/// Resolves the caller's identity from the `resolveforge_session` cookie or,
/// for non-browser clients, an `Authorization: Bearer <token>` header. The
/// API's auth layer calls [`authenticate`] and inserts the resulting
/// [`AuthContext`] into request extensions.
///
/// Also builds the `Set-Cookie` values written on login and logout.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use resolveforge_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Signed in as {}", auth.email)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::{validate_session_token, SessionClaims, SessionError};

/// HttpOnly cookie holding the session token
pub const SESSION_COOKIE: &str = "resolveforge_session";

/// Script-readable cookie holding the signed-in email, for display only
pub const EMAIL_COOKIE: &str = "resolveforge_email";

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
}

impl From<SessionClaims> for AuthContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not signed in")]
    MissingCredentials,

    #[error("Session expired, please sign in again")]
    Expired,

    #[error("Invalid session")]
    InvalidToken,
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => AuthError::Expired,
            _ => AuthError::InvalidToken,
        }
    }
}

/// Finds a cookie's value in the request's `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Extracts the session token, preferring the cookie over a Bearer header
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

/// Validates the request's session and returns the caller
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = session_token(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = validate_session_token(token, secret)?;
    Ok(claims.into())
}

/// Cookie attributes shared by login and logout
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Lifetime in seconds
    pub max_age: i64,

    /// Adds the `Secure` attribute (HTTPS deployments)
    pub secure: bool,
}

impl CookieSettings {
    pub fn new(ttl_days: i64, secure: bool) -> Self {
        Self {
            max_age: ttl_days * 24 * 60 * 60,
            secure,
        }
    }
}

fn build_cookie(name: &str, value: &str, max_age: i64, http_only: bool, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; Max-Age={}; SameSite=Lax", name, value, max_age);
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` values for a freshly signed-in user
pub fn session_cookies(token: &str, email: &str, settings: CookieSettings) -> [String; 2] {
    [
        build_cookie(SESSION_COOKIE, token, settings.max_age, true, settings.secure),
        build_cookie(EMAIL_COOKIE, email, settings.max_age, false, settings.secure),
    ]
}

/// `Set-Cookie` values that remove both session cookies
pub fn clear_session_cookies(secure: bool) -> [String; 2] {
    [
        build_cookie(SESSION_COOKIE, "", 0, true, secure),
        build_cookie(EMAIL_COOKIE, "", 0, false, secure),
    ]
}
