//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub jwt: JwtConfig,
    pub rooms: RoomsConfig,
    pub storage: StorageConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Environment type
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

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Room behavior tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RoomsConfig {
    #[serde(default = "default_typing_timeout_ms")]
    pub typing_timeout_ms: u64,
    /// Messages included in the join snapshot
    #[serde(default = "default_recent_history_limit")]
    pub recent_history_limit: u32,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    #[serde(default = "default_max_participants")]
    pub default_max_participants: u32,
    /// Capacity of each connection's outbound queue
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl RoomsConfig {
    #[must_use]
    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            typing_timeout_ms: default_typing_timeout_ms(),
            recent_history_limit: default_recent_history_limit(),
            max_message_length: default_max_message_length(),
            default_max_participants: default_max_participants(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

/// Attachment limits
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb) * 1024 * 1024
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "room-gateway".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_typing_timeout_ms() -> u64 {
    3000
}

fn default_recent_history_limit() -> u32 {
    50
}

fn default_max_message_length() -> usize {
    2000
}

fn default_max_participants() -> u32 {
    100
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_max_file_size() -> u32 {
    10
}

/// Parse an optional variable, falling back to `default` when it is unset.
fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required keys are missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => {
                Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?
            }
            None => Environment::default(),
        };

        let log_format = match lookup("LOG_FORMAT").map(|s| s.to_lowercase()) {
            Some(raw) if raw == "json" => LogFormat::Json,
            Some(raw) if raw == "pretty" => LogFormat::Pretty,
            Some(raw) => return Err(ConfigError::InvalidValue("LOG_FORMAT", raw)),
            None if env.is_production() => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        let port = lookup("GATEWAY_PORT").ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?;
        let port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GATEWAY_PORT", port))?;

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("JWT_SECRET"))?;

        let rooms = RoomsConfig {
            typing_timeout_ms: parse_or(&lookup, "TYPING_TIMEOUT_MS", default_typing_timeout_ms())?,
            recent_history_limit: parse_or(
                &lookup,
                "RECENT_HISTORY_LIMIT",
                default_recent_history_limit(),
            )?,
            max_message_length: parse_or(
                &lookup,
                "MAX_MESSAGE_LENGTH",
                default_max_message_length(),
            )?,
            default_max_participants: parse_or(
                &lookup,
                "DEFAULT_MAX_PARTICIPANTS",
                default_max_participants(),
            )?,
            outbound_buffer: parse_or(&lookup, "OUTBOUND_BUFFER", default_outbound_buffer())?,
        };

        if rooms.typing_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("TYPING_TIMEOUT_MS", "0".to_string()));
        }
        if rooms.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue("OUTBOUND_BUFFER", "0".to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port,
            },
            jwt: JwtConfig {
                secret,
                access_token_expiry: parse_or(
                    &lookup,
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry(),
                )?,
            },
            rooms,
            storage: StorageConfig {
                max_file_size_mb: parse_or(&lookup, "MAX_FILE_SIZE_MB", default_max_file_size())?,
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_or(&lookup, "WORKER_ID", 0)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
