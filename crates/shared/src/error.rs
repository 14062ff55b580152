//! Caller-facing error type.
//!
//! Domain crates map their own error enums into `AppError` at the library
//! boundary. Validation and conflict errors keep their detailed message;
//! not-found and internal failures carry only a generic message.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Stable machine-readable code.
        code: &'static str,
        /// Detail safe to show to the caller.
        message: String,
    },

    /// The requested transition conflicts with current state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Stable machine-readable code.
        code: &'static str,
        /// Detail safe to show to the caller.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal failure; details are logged, never returned.
    #[error("Internal error")]
    Internal,
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::Config(_) | Self::Internal => 500,
        }
    }

    /// Returns the error code for responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. } | Self::Conflict { code, .. } => code,
            Self::NotFound(_) => "NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
