//! Error types for the rate limiting service.

use thiserror::Error;

/// Main error type for rate limiting service operations.
///
/// Checking a rate limit never fails; these errors come from loading
/// configuration and running the HTTP surface.
#[derive(Error, Debug)]
pub enum RateLimitServiceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rate limiting service operations.
pub type Result<T> = std::result::Result<T, RateLimitServiceError>;
