//! Shared outbound HTTP plumbing.
//!
//! This crate is used by:
//! - `hero-azure-tools` (Azure Resource Manager + token endpoint)
//! - `hero-ai-tools` (chat completions)
//!
//! It owns client construction and error/URL redaction; it knows nothing about Azure or OpenAI.

pub mod client;
pub mod response;
pub mod safety;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpToolsError {
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HttpToolsError>;
