//! Error types for the context arbiter.
//!
//! Capacity rejection is the only failure `register` can produce. Path,
//! configuration and sink errors live in their own enums so callers never
//! have to match on variants that cannot occur for the call they made.

use crate::path::ContextPath;

// ---------------------------------------------------------------------------
// ArbiterError
// ---------------------------------------------------------------------------

/// Errors raised by [`ContextArbiter`](crate::ContextArbiter) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArbiterError {
    /// The path already has an active owner and a full standby queue.
    ///
    /// Terminal for this attempt: the registration was neither activated nor
    /// queued and the arbiter will not retry it.
    #[error("Registration rejected for context path {path}: standby queue is full (capacity {capacity})")]
    RegistrationRejected { path: ContextPath, capacity: usize },
}

// ---------------------------------------------------------------------------
// PathError
// ---------------------------------------------------------------------------

/// Errors raised when constructing a [`ContextPath`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Context path must not be empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating [`ArbiterConfig`](crate::ArbiterConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

// ---------------------------------------------------------------------------
// SinkError
// ---------------------------------------------------------------------------

/// Failure reported by a health or activity sink.
///
/// The arbiter never propagates these: it logs them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    #[error("Sink rejected write: {0}")]
    Rejected(String),
}
