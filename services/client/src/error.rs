//! services/client/src/error.rs
//!
//! Defines the primary error type for the sync client.

use crate::config::ConfigError;
use wellness_core::ports::PortError;

/// The primary error type for the `client` crate.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A session-scoped operation was attempted before a session was established.
    #[error("No session is available")]
    AuthUnavailable,

    /// The store rejected or dropped a live query.
    #[error("Subscription to {key} failed: {reason}")]
    SubscriptionFailure { key: String, reason: String },

    /// A create, update or delete was rejected by the store.
    #[error("Write failed: {0}")]
    WriteFailure(String),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error from running the embedded store migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// A convenience type alias for `Result<T, SyncError>`.
pub type SyncResult<T> = Result<T, SyncError>;
