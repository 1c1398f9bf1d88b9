//! # ResolveForge API Server
//!
//! HTTP backend for ResolveForge: accounts and sessions, metered complaint
//! analysis with a monthly free-tier quota, the claims dashboard, and the
//! marketing forms.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p resolveforge-api
//! ```
//!
//! Set `LOG_FORMAT=json` for JSON log lines; `RUST_LOG` overrides the default
//! filter.

use std::sync::Arc;

use anyhow::Context;
use resolveforge_api::{
    app::{build_router, AppState},
    config::Config,
};
use resolveforge_shared::{
    analysis::OpenAiAnalyser,
    db::{migrations, pool},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resolveforge_api=debug,resolveforge_shared=info,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("ResolveForge API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;

    if !config.api.production {
        migrations::ensure_database_exists(&config.database.url)
            .await
            .context("Failed to create development database")?;
    }

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    if config.run_migrations {
        migrations::run_migrations(&db)
            .await
            .context("Failed to run database migrations")?;
    }

    let analyser = OpenAiAnalyser::new(config.openai_config()).context("Failed to configure OpenAI client")?;
    tracing::info!(model = %analyser.model(), "Complaint analyser ready");

    let bind_address = config.bind_address();
    let state = AppState::with_postgres(db.clone(), config, Arc::new(analyser));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}
