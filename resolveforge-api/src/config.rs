/// Configuration management for the API server
///
/// Loads configuration from environment variables (and a `.env` file in
/// development) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:8080`)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default `*`)
/// - `PRODUCTION`: enables `Secure` cookies and HSTS (default `false`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
/// - `SESSION_SECRET`: session signing key, at least 32 characters (required)
/// - `SESSION_TTL_DAYS`: session lifetime (default 365)
/// - `FREE_MONTHLY_LIMIT`: free-tier analyses per month (default 5)
/// - `PLAN_LIMITS`: caps for paid tiers, e.g. `starter=50,team=500`
/// - `OPENAI_API_KEY`: language model key (required)
/// - `OPENAI_BASE_URL`, `OPENAI_MODEL`, `OPENAI_TIMEOUT_SECS`, `OPENAI_MAX_RETRIES`
/// - `RUN_MIGRATIONS`: apply embedded migrations at startup (default `true`)
///
/// # Example
///
/// ```no_run
/// use resolveforge_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use resolveforge_shared::analysis::openai::{OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use resolveforge_shared::auth::session::DEFAULT_SESSION_TTL_DAYS;
use resolveforge_shared::quota::{QuotaPolicy, FREE_TIER_MONTHLY_LIMIT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub session: SessionConfig,

    pub quota: QuotaConfig,

    pub llm: LlmConfig,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode (Secure cookies, HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 signing key
    ///
    /// Must be kept secret and be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub ttl_days: i64,
}

/// Monthly quota configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub free_monthly_limit: u32,

    /// Caps for named paid tiers; unlisted paid tiers are unlimited
    pub plan_limits: HashMap<String, u32>,
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(skip_serializing)]
    pub api_key: String,

    pub base_url: String,

    pub model: String,

    pub timeout_secs: u64,

    pub max_retries: u32,
}

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {}", name, e)),
        _ => Ok(default),
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", name))
}

/// Parses a comma-separated origin list
pub fn parse_cors_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `tier=cap` pairs, e.g. `starter=50, team=500`
pub fn parse_plan_limits(value: &str) -> anyhow::Result<HashMap<String, u32>> {
    let mut limits = HashMap::new();

    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (tier, cap) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("PLAN_LIMITS entry '{}' must be tier=cap", entry))?;

        let tier = tier.trim().to_ascii_lowercase();
        if tier.is_empty() {
            anyhow::bail!("PLAN_LIMITS entry '{}' has an empty tier name", entry);
        }
        if tier == "free" {
            anyhow::bail!("PLAN_LIMITS cannot set the free tier; use FREE_MONTHLY_LIMIT");
        }

        let cap = cap
            .trim()
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("PLAN_LIMITS cap for '{}' is invalid: {}", tier, e))?;
        limits.insert(tier, cap);
    }

    Ok(limits)
}

/// Upper bound for `OPENAI_MAX_RETRIES`
pub const MAX_LLM_RETRIES: u32 = 10;

fn validate_max_retries(value: u32) -> anyhow::Result<u32> {
    if value > MAX_LLM_RETRIES {
        anyhow::bail!("OPENAI_MAX_RETRIES must be at most {}", MAX_LLM_RETRIES);
    }
    Ok(value)
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }

        let free_monthly_limit = env_or("FREE_MONTHLY_LIMIT", FREE_TIER_MONTHLY_LIMIT)?;
        if free_monthly_limit == 0 {
            anyhow::bail!("FREE_MONTHLY_LIMIT must be greater than zero");
        }

        let ttl_days = env_or("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)?;
        if ttl_days <= 0 {
            anyhow::bail!("SESSION_TTL_DAYS must be positive");
        }

        let max_retries = validate_max_retries(env_or("OPENAI_MAX_RETRIES", 2)?)?;

        Ok(Self {
            api: ApiConfig {
                host: env_or("API_HOST", "0.0.0.0".to_string())?,
                port: env_or("API_PORT", 8080)?,
                cors_origins: parse_cors_origins(&env_or("CORS_ORIGINS", "*".to_string())?),
                production: env_or("PRODUCTION", false)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            session: SessionConfig {
                secret: session_secret,
                ttl_days,
            },
            quota: QuotaConfig {
                free_monthly_limit,
                plan_limits: parse_plan_limits(&env_or("PLAN_LIMITS", String::new())?)?,
            },
            llm: LlmConfig {
                api_key: required("OPENAI_API_KEY")?,
                base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL.to_string())?,
                model: env_or("OPENAI_MODEL", DEFAULT_MODEL.to_string())?,
                timeout_secs: env_or("OPENAI_TIMEOUT_SECS", 60)?,
                max_retries,
            },
            run_migrations: env_or("RUN_MIGRATIONS", true)?,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Builds the quota policy from the configured limits
    pub fn quota_policy(&self) -> QuotaPolicy {
        self.quota
            .plan_limits
            .iter()
            .fold(QuotaPolicy::new(self.quota.free_monthly_limit), |policy, (tier, cap)| {
                policy.with_tier_limit(tier.clone(), *cap)
            })
    }

    /// Client settings for the language model provider
    pub fn openai_config(&self) -> OpenAiConfig {
        let mut config = OpenAiConfig::new(self.llm.api_key.clone());
        config.base_url = self.llm.base_url.clone();
        config.model = self.llm.model.clone();
        config.timeout_secs = self.llm.timeout_secs;
        config.max_retries = self.llm.max_retries;
        config
    }
}
