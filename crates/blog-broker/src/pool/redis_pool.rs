//! Pooled Redis connections for the publisher side.
//!
//! One pool per process; the publisher borrows a connection per publish,
//! while the subscriber holds its own dedicated pub/sub connection and
//! never touches the pool.

use deadpool_redis::{Config, Pool, Runtime};

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: usize,
}

impl From<&blog_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &blog_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Error type for broker pool operations
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Event encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for broker pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Build the pool; connections are opened lazily
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        // Credentials, if any, sit before the '@'; keep them out of the log
        let host_part = config.url.rsplit('@').next().unwrap_or(&config.url);
        tracing::info!(
            url = %host_part,
            max_connections = config.max_connections,
            "Redis publish pool ready"
        );

        Ok(Self { pool })
    }

    /// Borrow a connection from the pool
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}
