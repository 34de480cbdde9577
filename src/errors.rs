/*!
 * Error types for the russian-anki translation engine.
 *
 * Provider calls fail with `ProviderError`, the retry layer wraps those into
 * `TranslationError`, and only `AppError::Configuration` is meant to reach
 * the caller of the engine. Storage failures never leave the cache.
 */

use thiserror::Error;

/// Errors that can occur when calling a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending the API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when the response envelope cannot be read
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Build a provider error from a reqwest failure
    pub fn from_reqwest(error: reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while translating a single word
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The provider kept failing until the retry policy gave up
    #[error("Provider '{provider}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Name of the abandoned provider
        provider: String,
        /// Number of attempts made
        attempts: u32,
        /// The last error returned by the provider
        #[source]
        source: ProviderError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credential or otherwise unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
