//! Configuration loading

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, JwtConfig, RedisConfig,
    ServerConfig, SnowflakeConfig,
};
