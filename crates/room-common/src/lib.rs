//! # room-common
//!
//! Shared utilities: configuration, error handling, the JWT identity
//! provider, password hashing, and tracing setup.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

pub use auth::{hash_password, verify_password, Claims, JwtService};
pub use config::{
    AppConfig, AppSettings, ConfigError, Environment, JwtConfig, LogFormat, RoomsConfig,
    ServerConfig, SnowflakeConfig, StorageConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
