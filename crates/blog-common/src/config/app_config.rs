//! Application configuration.
//!
//! Everything comes from environment variables; a `.env` file is honored
//! for local development. A variable that is present but unparsable is a
//! hard error, not a silent fallback to the default.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Top-level configuration for one gateway process
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub snowflake: SnowflakeConfig,
}

/// Process identity and deployment environment
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "defaults::app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Gateway listen address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// PostgreSQL pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "defaults::db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "defaults::db_min_connections")]
    pub min_connections: u32,
}

/// Redis pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "defaults::redis_max_connections")]
    pub max_connections: u32,
}

/// Token signing settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    #[serde(default = "defaults::token_expiry")]
    pub token_expiry: i64,
}

/// Snowflake ID generator settings
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

mod defaults {
    pub fn app_name() -> String {
        "blog-realtime".to_string()
    }

    pub fn host() -> String {
        "127.0.0.1".to_string()
    }

    pub fn db_max_connections() -> u32 {
        20
    }

    pub fn db_min_connections() -> u32 {
        5
    }

    pub fn redis_max_connections() -> u32 {
        10
    }

    // 15 minutes
    pub fn token_expiry() -> i64 {
        900
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error when a required variable is absent or any present
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| defaults::app_name()),
                env: optional("APP_ENV")?.unwrap_or_default(),
            },
            gateway: ServerConfig {
                host: env::var("GATEWAY_HOST").unwrap_or_else(|_| defaults::host()),
                port: required("GATEWAY_PORT")?,
            },
            database: DatabaseConfig {
                url: required_raw("DATABASE_URL")?,
                max_connections: optional("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(defaults::db_max_connections),
                min_connections: optional("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(defaults::db_min_connections),
            },
            redis: RedisConfig {
                url: required_raw("REDIS_URL")?,
                max_connections: optional("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(defaults::redis_max_connections),
            },
            jwt: JwtConfig {
                secret: required_raw("JWT_SECRET")?,
                token_expiry: optional("JWT_TOKEN_EXPIRY")?
                    .unwrap_or_else(defaults::token_expiry),
            },
            snowflake: SnowflakeConfig {
                worker_id: optional("WORKER_ID")?.unwrap_or(0),
            },
        })
    }
}

/// A variable that must be present, taken verbatim
fn required_raw(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

/// A variable that must be present and parse as `T`
fn required<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    let raw = required_raw(name)?;
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue(name, raw))
}

/// A variable that may be absent, but must parse if present
fn optional<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Errors surfaced while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} has unusable value {1:?}")]
    InvalidValue(&'static str, String),
}
