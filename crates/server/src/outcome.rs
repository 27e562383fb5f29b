//! Tool results as values.
//!
//! Handlers never propagate failures to the protocol layer: a failure becomes an error record
//! (structured tools) or an `Error: ...` string (text tools), flagged with `isError`.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// `{ "error": <message>, "resource_group"?: <name> }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

impl ErrorRecord {
    #[must_use]
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            resource_group: None,
        }
    }

    #[must_use]
    pub fn for_group(error: impl ToString, resource_group: &str) -> Self {
        Self {
            error: error.to_string(),
            resource_group: Some(resource_group.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome<T> {
    Success(T),
    Failure(ErrorRecord),
}

impl<T: Serialize> ToolOutcome<T> {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// `structuredContent` plus the same JSON as a text block.
    #[must_use]
    pub fn into_call_result(self) -> CallToolResult {
        let failed = self.is_failure();
        match serde_json::to_value(&self) {
            Ok(v) if failed => CallToolResult::structured_error(v),
            Ok(v) => CallToolResult::structured(v),
            Err(e) => CallToolResult::error(vec![Content::text(format!(
                "Error: failed to encode result: {e}"
            ))]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    Success(String),
    /// Full text, already prefixed with `Error: `.
    Failure(String),
}

impl TextOutcome {
    #[must_use]
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self::Failure(format!("Error: {message}"))
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(t) | Self::Failure(t) => t,
        }
    }

    #[must_use]
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            Self::Success(t) => CallToolResult::success(vec![Content::text(t)]),
            Self::Failure(t) => CallToolResult::error(vec![Content::text(t)]),
        }
    }
}
