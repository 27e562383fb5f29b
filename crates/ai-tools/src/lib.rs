//! AI-backed troubleshooting text.
//!
//! The agent renders a prompt template, sends it to a chat-completion backend and returns the
//! raw answer. Every failure path (no backend, no template, backend error) degrades to the
//! deterministic text in [`fallback`]; callers always get a string back.

pub mod agent;
pub mod completion;
pub mod details;
pub mod error;
pub mod fallback;
pub mod prompts;

pub use agent::{AnalysisText, TroubleshootingAgent};
pub use completion::{CompletionClient, OpenAiChatClient};
pub use details::ErrorDetails;
pub use error::{AiError, Result};
pub use prompts::{PromptLibrary, PromptPaths, PromptTemplate};
