//! Room Gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p room-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use room_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(te) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {te}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::from_settings(&config.app)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.gateway.address(),
        "Configuration loaded"
    );

    if let Err(e) = room_gateway::run(config).await {
        error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }
}
