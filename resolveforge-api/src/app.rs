/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use resolveforge_api::{app::{build_router, AppState}, config::Config};
/// use resolveforge_shared::analysis::OpenAiAnalyser;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let analyser = Arc::new(OpenAiAnalyser::new(config.openai_config())?);
/// let state = AppState::with_postgres(pool, config, analyser);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use resolveforge_shared::analysis::Analyser;
use resolveforge_shared::auth::middleware::{authenticate, CookieSettings};
use resolveforge_shared::quota::{PgPlanDirectory, PgUsageStore, QuotaTracker};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Monthly analysis quota
    pub quota: Arc<QuotaTracker>,

    /// Complaint analyser
    pub analyser: Arc<dyn Analyser>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, quota: QuotaTracker, analyser: Arc<dyn Analyser>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            quota: Arc::new(quota),
            analyser,
        }
    }

    /// State whose quota tracker reads plans and usage from `db`
    pub fn with_postgres(db: PgPool, config: Config, analyser: Arc<dyn Analyser>) -> Self {
        let quota = QuotaTracker::new(
            Arc::new(PgPlanDirectory::new(db.clone())),
            Arc::new(PgUsageStore::new(db.clone())),
            config.quota_policy(),
        );
        Self::new(db, config, quota, analyser)
    }

    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings::new(self.config.session.ttl_days, self.config.api.production)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health
/// └── /api/
///     ├── POST /signup, /login, /logout          (public)
///     ├── POST /early-access, /contact           (public)
///     ├── GET  /me                               (session)
///     ├── GET  /usage, /usage/history            (session)
///     ├── POST /analyse                          (session, metered)
///     └── GET  /claims, /claims/:id              (session)
/// ```
///
/// Middleware, outermost first: security headers, CORS, tracing, then the
/// session layer on authenticated routes.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/early-access", post(routes::early_access::join))
        .route("/contact", post(routes::contact::submit));

    let session_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/usage", get(routes::usage::current))
        .route("/usage/history", get(routes::usage::history))
        .route("/analyse", post(routes::analyse::analyse))
        .route("/claims", get(routes::claims::list_claims))
        .route("/claims/:id", get(routes::claims::get_claim))
        .layer(axum::middleware::from_fn_with_state(state.clone(), session_auth_layer));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", public_routes.merge(session_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication layer
///
/// Resolves the caller from the session cookie or Bearer header and inserts
/// an `AuthContext` into request extensions.
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.session_secret())?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
