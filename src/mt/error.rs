//! Error types for the translation client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MtError {
    /// The bearer token could not be obtained
    #[error("Credential error: {0}")]
    AuthError(String),
    /// The translation service answered with a non-success status
    #[error("Remote error {code}: {message}")]
    RemoteError { code: i64, message: String },
    /// The request never got a response (connect failure, timeout, TLS, ...)
    #[error("Transport error: {0}")]
    TransportError(String),
    /// A success response whose body does not have the expected shape
    #[error("Invalid API response: {0}")]
    ResponseError(String),
    /// Language code that cannot be sent to the provider
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Bad configuration file or option value
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Numbered markers missing from the translated text
    #[error("Marker mismatch: {0}")]
    MarkerMismatch(String),
}

impl From<reqwest::Error> for MtError {
    fn from(error: reqwest::Error) -> Self {
        MtError::TransportError(error.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
