/*!
 * Error types for the sublocalizer library.
 *
 * This module contains custom error types for different parts of the library,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Error with authentication (bad or missing credentials)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Error when the provider quota is exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Error establishing or maintaining a connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend returned a different number of translations than requested
    #[error("Backend returned {returned} translations for {expected} texts")]
    ProtocolMismatch {
        /// Number of texts sent to the backend
        expected: usize,
        /// Number of translations the backend returned
        returned: usize,
    },

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

impl BackendError {
    /// Whether this error is a transport-level rate limit signal
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Errors that can occur during translation orchestration
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Output slots left unwritten after all batches resolved.
    /// This indicates broken group bookkeeping and should never occur.
    #[error("Missing translations for indexes: {0:?}")]
    UnresolvedSlots(Vec<usize>),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Error from translation orchestration
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
