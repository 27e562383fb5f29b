//! Extract provider error details from non-2xx responses.
//!
//! Azure Resource Manager and OpenAI both report failures as
//! `{"error": {"code": "...", "message": "..."}}`; the Entra ID token endpoint uses
//! `{"error": "...", "error_description": "..."}`. Anything else falls back to the raw body.

use serde_json::Value;
use std::fmt;

const MAX_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "HTTP {} ({code}): {}", self.status, self.message),
            None => write!(f, "HTTP {}: {}", self.status, self.message),
        }
    }
}

/// Consume a failed response and describe it.
///
/// Never fails: a body that cannot be read is reported by status alone.
pub async fn api_failure(resp: reqwest::Response) -> ApiFailure {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    parse_api_failure(status.as_u16(), status.canonical_reason(), &body)
}

#[must_use]
pub fn parse_api_failure(status: u16, reason: Option<&str>, body: &str) -> ApiFailure {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let (code, message) = match parsed.as_ref().and_then(|v| v.get("error")) {
        Some(Value::Object(err)) => (
            err.get("code").and_then(Value::as_str).map(str::to_string),
            err.get("message").and_then(Value::as_str).map(str::to_string),
        ),
        Some(Value::String(code)) => (
            Some(code.clone()),
            parsed
                .as_ref()
                .and_then(|v| v.get("error_description"))
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        _ => (None, None),
    };

    let message = message.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            reason.unwrap_or("request failed").to_string()
        } else {
            trimmed.chars().take(MAX_BODY_CHARS).collect()
        }
    });

    ApiFailure {
        status,
        code,
        message,
    }
}
