//! Error Handling
//!
//! Unified error types for the plugin management core.
//! Uses thiserror for ergonomic error definitions.
//!
//! Only caller/shape errors surface through `AppError`; soft conditions
//! (missing module, duplicate registration, hook rejections) are logged
//! at the originating call site and never propagate.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors (malformed descriptors, bad shapes)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Convert AppError to a string for embedders that surface plain messages
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
