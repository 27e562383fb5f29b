//! Error types for `hero-ai-tools`.

use hero_http_tools::response::ApiFailure;
use hero_http_tools::safety::sanitize_reqwest_error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    /// Invalid base URL, unreadable template file, and similar startup problems.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template failed to parse or render.
    #[error("Template error: {0}")]
    Template(String),

    /// The completion service answered with a non-success status.
    #[error("Completion API error: {0}")]
    Api(ApiFailure),

    #[error("HTTP error: {0}")]
    Http(String),

    /// A success response without usable content.
    #[error("Unexpected completion response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(sanitize_reqwest_error(&value))
        } else {
            Self::Http(sanitize_reqwest_error(&value))
        }
    }
}

impl From<tera::Error> for AiError {
    fn from(value: tera::Error) -> Self {
        // Tera puts the useful part (which variable, which line) in the source chain.
        let mut msg = value.to_string();
        let mut source = std::error::Error::source(&value);
        while let Some(s) = source {
            msg.push_str(": ");
            msg.push_str(&s.to_string());
            source = s.source();
        }
        Self::Template(msg)
    }
}

pub type Result<T> = std::result::Result<T, AiError>;
