//! Server wiring.
//!
//! Builds the router, connects the pools, and assembles every dependency
//! into a `GatewayState`.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::HandshakeAuth;
use crate::connection::StreamRegistry;
use crate::dispatch::EventDispatcher;
use blog_broker::{Publisher, RedisPool, RedisPoolConfig, SubscriberConfig};
use blog_common::auth::TokenVerifier;
use blog_common::{AppConfig, AppError};
use blog_service::ServiceContextBuilder;

/// Routes exposed by the gateway
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/stream", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Liveness probe
async fn health_check() -> &'static str {
    "OK"
}

/// Router plus middleware and state
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect to every backing service and assemble the shared state
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL");
    let db_config = blog_db::DatabaseConfig::from(&config.database);
    let pool = blog_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL pool ready");

    tracing::info!("Connecting to Redis");
    let redis_config = RedisPoolConfig::from(&config.redis);
    let redis_pool = RedisPool::new(redis_config).map_err(|e| AppError::Broker(e.to_string()))?;
    tracing::info!("Redis pool ready");

    // Token verifier and id generator
    let verifier = Arc::new(TokenVerifier::new(
        &config.jwt.secret,
        config.jwt.token_expiry,
    ));
    let snowflake_generator = Arc::new(blog_core::SnowflakeGenerator::new(
        config.snowflake.worker_id,
    ));

    // Repositories over the shared pool
    let user_repo = Arc::new(blog_db::PgUserRepository::new(pool.clone()));
    let post_repo = Arc::new(blog_db::PgPostRepository::new(pool.clone()));
    let comment_repo = Arc::new(blog_db::PgCommentRepository::new(pool.clone()));
    let reaction_repo = Arc::new(blog_db::PgReactionRepository::new(pool.clone()));
    let notification_repo = Arc::new(blog_db::PgNotificationRepository::new(pool.clone()));
    let tag_repo = Arc::new(blog_db::PgTagRepository::new(pool.clone()));
    let counter_maintainer = Arc::new(blog_db::PgCounterCacheMaintainer::new(pool));

    // Stream publisher over Redis
    let publisher = Arc::new(Publisher::new(redis_pool));

    // Application services
    let services = ServiceContextBuilder::new()
        .user_repo(user_repo.clone())
        .post_repo(post_repo)
        .comment_repo(comment_repo)
        .reaction_repo(reaction_repo)
        .notification_repo(notification_repo)
        .tag_repo(tag_repo)
        .publisher(publisher)
        .counter_maintainer(counter_maintainer)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    // Handshake authentication
    let auth = Arc::new(HandshakeAuth::new(verifier, user_repo));

    // Registry and broker bridge
    let registry = StreamRegistry::new_shared();

    let subscriber_config = SubscriberConfig {
        redis_url: config.redis.url.clone(),
        ..Default::default()
    };
    let dispatcher = EventDispatcher::new(subscriber_config, registry.clone())
        .await
        .map_err(|e| AppError::Broker(format!("Failed to create event dispatcher: {e}")))?;
    let dispatcher = Arc::new(dispatcher);

    Ok(GatewayState::new(services, registry, dispatcher, auth))
}

/// Serve the app on the given address until the process is stopped
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Cannot bind {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/stream", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server terminated: {e}")))?;

    Ok(())
}

/// Wire everything from config and serve
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
