//! Error types for `hero-azure-tools`.

use hero_http_tools::response::ApiFailure;
use hero_http_tools::safety::sanitize_reqwest_error;
use thiserror::Error;

/// Main error type for Azure operations.
#[derive(Error, Debug)]
pub enum AzureError {
    /// Invalid endpoint URLs or other static configuration problems.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable credential, or the token endpoint refused to issue one.
    #[error("Credential error: {0}")]
    Credential(String),

    /// ARM answered with a non-success status.
    #[error("Azure API error: {0}")]
    Api(ApiFailure),

    /// Transport failures (DNS, TLS, connection reset, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A success response whose body did not have the expected shape.
    #[error("Unexpected Azure response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AzureError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(sanitize_reqwest_error(&value))
        } else {
            Self::Http(sanitize_reqwest_error(&value))
        }
    }
}

/// Result type alias for Azure operations.
pub type Result<T> = std::result::Result<T, AzureError>;
