//! Gateway server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p blog-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use blog_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so tracing can follow the environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let tracing_config = if config.app.env.is_production() {
        TracingConfig::production()
    } else {
        TracingConfig::development()
    };
    if let Err(e) = try_init_tracing(&tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.gateway.port,
        "Configuration loaded"
    );

    if let Err(e) = blog_gateway::run(config).await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}
