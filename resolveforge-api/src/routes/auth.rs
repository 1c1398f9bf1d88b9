/// Account endpoints
///
/// # Endpoints
///
/// - `POST /api/signup` - Create an account with email and password
/// - `POST /api/login` - Sign in; unseen emails get an account on the spot
/// - `POST /api/logout` - Clear the session cookies
/// - `GET /api/me` - Current account
///
/// Successful signup and login set two cookies: the HttpOnly session token
/// and a script-readable email cookie the landing page uses for display.
///
/// Accounts created before passwords existed have no hash. The first
/// password supplied for such an account, via signup or login, becomes its
/// password.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::State,
    http::{header, HeaderName},
    response::AppendHeaders,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use resolveforge_shared::{
    auth::{
        middleware::{clear_session_cookies, session_cookies, AuthContext},
        password,
        session::{create_session_token, SessionClaims},
    },
    models::{
        normalize_email,
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Signup and login request
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

/// Signup and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub email: String,
    pub plan: String,
}

/// Current account
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

type WithCookies<T> = (AppendHeaders<[(HeaderName, String); 2]>, Json<T>);

const WRONG_CREDENTIALS: &str = "Incorrect email or password.";

impl CredentialsRequest {
    fn normalized(self) -> ApiResult<Self> {
        let req = Self {
            email: normalize_email(&self.email),
            password: self.password,
        };
        req.validate()?;
        Ok(req)
    }
}

fn check_strength(password: &str) -> ApiResult<()> {
    password::validate_password_strength(password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })
}

async fn hash_password(plain: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| ApiError::InternalError(format!("Password hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_password(plain: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Password verification task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Signs in an existing account with the supplied password
///
/// Verifies against the stored hash, or attaches the password to a legacy
/// passwordless account.
async fn sign_in_existing(state: &AppState, user: User, plain: String) -> ApiResult<User> {
    match user.password_hash.clone() {
        Some(hash) => {
            if verify_password(plain, hash).await? {
                Ok(user)
            } else {
                tracing::info!(user_id = %user.id, "Login rejected: password mismatch");
                Err(ApiError::Unauthorized(WRONG_CREDENTIALS.to_string()))
            }
        }
        None => {
            check_strength(&plain)?;
            let hash = hash_password(plain).await?;
            let claimed = User::claim_password(&state.db, user.id, &hash).await?;
            tracing::info!(user_id = %user.id, "Password attached to legacy account");
            // Another request set a password first
            claimed.ok_or_else(|| ApiError::Unauthorized(WRONG_CREDENTIALS.to_string()))
        }
    }
}

/// Records the login and builds the cookie-bearing response
async fn start_session(state: &AppState, user: User) -> ApiResult<WithCookies<SessionResponse>> {
    User::update_last_login(&state.db, user.id).await?;

    let claims = SessionClaims::new(user.id, user.email.clone(), state.config.session.ttl_days);
    let token = create_session_token(&claims, state.session_secret())?;
    let [session, email] = session_cookies(&token, &user.email, state.cookie_settings());

    Ok((
        AppendHeaders([(header::SET_COOKIE, session), (header::SET_COOKIE, email)]),
        Json(SessionResponse {
            success: true,
            user_id: user.id,
            email: user.email,
            plan: user.plan,
        }),
    ))
}

/// Create an account
///
/// ```text
/// POST /api/signup
/// {"email": "jo@example.co.uk", "password": "Faulty-Kettle1"}
/// ```
///
/// # Errors
///
/// - `409 Conflict`: the email already has a password
/// - `422 Unprocessable Entity`: invalid email or weak password
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<WithCookies<SessionResponse>> {
    let req = req.normalized()?;
    check_strength(&req.password)?;

    let user = match User::find_by_email(&state.db, &req.email).await? {
        Some(existing) if existing.has_password() => {
            return Err(ApiError::Conflict(
                "An account with this email already exists. Please log in.".to_string(),
            ));
        }
        Some(legacy) => {
            let hash = hash_password(req.password).await?;
            User::claim_password(&state.db, legacy.id, &hash)
                .await?
                .ok_or_else(|| {
                    ApiError::Conflict("An account with this email already exists. Please log in.".to_string())
                })?
        }
        None => {
            let hash = hash_password(req.password).await?;
            User::create(
                &state.db,
                CreateUser {
                    email: req.email,
                    password_hash: Some(hash),
                    plan: None,
                },
            )
            .await?
        }
    };

    tracing::info!(user_id = %user.id, "Account signed up");
    start_session(&state, user).await
}

/// Sign in, creating the account if the email is new
///
/// ```text
/// POST /api/login
/// {"email": "jo@example.co.uk", "password": "Faulty-Kettle1"}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: wrong password
/// - `422 Unprocessable Entity`: invalid email, or a weak password for a new account
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<WithCookies<SessionResponse>> {
    let req = req.normalized()?;

    let user = match User::find_by_email(&state.db, &req.email).await? {
        Some(user) => sign_in_existing(&state, user, req.password).await?,
        None => {
            check_strength(&req.password)?;
            let hash = hash_password(req.password.clone()).await?;
            let (user, created) = User::find_or_create(
                &state.db,
                CreateUser {
                    email: req.email,
                    password_hash: Some(hash),
                    plan: None,
                },
            )
            .await?;

            if created {
                tracing::info!(user_id = %user.id, "Account created on first login");
                user
            } else {
                sign_in_existing(&state, user, req.password).await?
            }
        }
    };

    tracing::info!(user_id = %user.id, "Logged in");
    start_session(&state, user).await
}

/// Clear the session cookies
pub async fn logout(State(state): State<AppState>) -> WithCookies<serde_json::Value> {
    let [session, email] = clear_session_cookies(state.config.api.production);

    (
        AppendHeaders([(header::SET_COOKIE, session), (header::SET_COOKIE, email)]),
        Json(serde_json::json!({ "success": true })),
    )
}

/// Current account
///
/// # Errors
///
/// - `401 Unauthorized`: the session refers to an account that no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))?;

    Ok(Json(MeResponse {
        user_id: user.id,
        email: user.email,
        plan: user.plan,
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }))
}
