//! Error types for financial concept operations.
//!
//! The `Display` text of every variant is what the operator sees, so the
//! messages are written to be surfaced verbatim.

use thiserror::Error;

/// Result type alias for financial concept operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for financial concept operations.
#[derive(Error, Debug)]
pub enum Error {
    // Lookup errors (10-19)
    #[error("concept {id} not found")]
    NotFound { id: String },

    // Input errors (20-29)
    #[error("validation failed: {0}")]
    Validation(String),

    // Lifecycle errors (30-39)
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("cannot {action} concept {id} while it is {from}")]
    InvalidTransition {
        id: String,
        from: String,
        action: &'static str,
    },

    // Configuration errors (40-49)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] on the given id.
    pub fn not_found(id: impl ToString) -> Self {
        Error::NotFound { id: id.to_string() }
    }

    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::NotFound { .. } => 10,
            Error::Validation(_) => 20,
            Error::InvalidState(_) => 30,
            Error::InvalidTransition { .. } => 31,
            Error::Config(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Stable snake_case label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::InvalidState(_) => "invalid_state",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}
