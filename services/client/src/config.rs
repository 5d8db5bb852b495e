//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres-backed document store. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// The application namespace segment of every collection path.
    pub app_id: String,
    /// Custom sign-in token handed to the application, if any.
    pub initial_auth_token: Option<String>,
    pub log_level: Level,
    /// How long the simulated therapist waits before replying.
    pub consultation_reply_delay: Duration,
    /// Seeds the responder's phrase picker. Unset means entropy-seeded.
    pub responder_seed: Option<u64>,
    pub affirmation_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            app_id: "demo-app".to_string(),
            initial_auth_token: None,
            log_level: Level::INFO,
            consultation_reply_delay: Duration::from_millis(2000),
            responder_seed: None,
            affirmation_interval: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Store & Namespace ---
        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let app_id = lookup("APP_ID").unwrap_or(defaults.app_id);
        if app_id.trim().is_empty() || app_id.contains('/') {
            return Err(ConfigError::InvalidValue(
                "APP_ID".to_string(),
                format!("'{}' is not a valid path segment", app_id),
            ));
        }

        let initial_auth_token = lookup("INITIAL_AUTH_TOKEN").filter(|s| !s.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Responder Settings ---
        let consultation_reply_delay = match lookup("CONSULTATION_REPLY_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("CONSULTATION_REPLY_DELAY_MS", &raw)?),
            None => defaults.consultation_reply_delay,
        };
        let responder_seed = lookup("RESPONDER_SEED")
            .map(|raw| parse_number("RESPONDER_SEED", &raw))
            .transpose()?;
        let affirmation_interval = match lookup("AFFIRMATION_INTERVAL_SECS") {
            Some(raw) => match parse_number("AFFIRMATION_INTERVAL_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::InvalidValue(
                        "AFFIRMATION_INTERVAL_SECS".to_string(),
                        "must be at least 1".to_string(),
                    ))
                }
                secs => Duration::from_secs(secs),
            },
            None => defaults.affirmation_interval,
        };

        Ok(Self {
            database_url,
            app_id,
            initial_auth_token,
            log_level,
            consultation_reply_delay,
            responder_seed,
            affirmation_interval,
        })
    }
}

fn parse_number(var: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))
}
