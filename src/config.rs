//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `JWT_SECRET` (optional): HMAC secret used to sign access tokens,
///   defaults to a development-only value that must be overridden in production
/// - `JWT_EXPIRE_MINUTES` (optional): access token validity window, defaults to 60
/// - `RESET_EXPIRE_MINUTES` (optional): password reset token validity window, defaults to 30
/// - `CONVERT_CONCURRENCY` (optional): max parallel conversions within one batch, defaults to 4
/// - `CONVERT_TIMEOUT_SECS` (optional): per-item conversion timeout, defaults to 10
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expire_minutes")]
    pub jwt_expire_minutes: i64,

    #[serde(default = "default_reset_expire_minutes")]
    pub reset_expire_minutes: i64,

    #[serde(default = "default_convert_concurrency")]
    pub convert_concurrency: usize,

    #[serde(default = "default_convert_timeout_secs")]
    pub convert_timeout_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

/// Development-only signing secret. Override in any real deployment.
fn default_jwt_secret() -> String {
    "dev-insecure-secret-change".to_string()
}

fn default_jwt_expire_minutes() -> i64 {
    60
}

fn default_reset_expire_minutes() -> i64 {
    30
}

fn default_convert_concurrency() -> usize {
    4
}

fn default_convert_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
