//! Prompt templates loaded from disk at startup.
//!
//! Templates use Tera syntax (`{{ deployment_state }}`). A missing file is not an error: the
//! slot stays empty and the agent falls back to deterministic text for that analysis.

use crate::error::{AiError, Result};
use std::path::{Path, PathBuf};
use tera::Tera;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert Azure network engineer. \
Analyze the information you are given and provide a root cause analysis, a step-by-step \
troubleshooting guide, and prevention recommendations. Be clear and actionable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    ErrorAnalysis,
    ResourceAnalysis,
}

impl PromptTemplate {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ErrorAnalysis => "error_analysis",
            Self::ResourceAnalysis => "resource_analysis",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptPaths {
    pub system_prompt: Option<PathBuf>,
    pub error_analysis: Option<PathBuf>,
    pub resource_analysis: Option<PathBuf>,
}

pub struct PromptLibrary {
    tera: Tera,
    system_prompt: Option<String>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::empty()
    }
}

impl PromptLibrary {
    /// No templates; every analysis uses the deterministic fallback.
    #[must_use]
    pub fn empty() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        Self {
            tera,
            system_prompt: None,
        }
    }

    /// Load whichever of the configured files exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read, or if a template does not parse.
    pub fn load(paths: &PromptPaths) -> Result<Self> {
        let mut lib = Self::empty();

        if let Some(path) = &paths.system_prompt
            && let Some(text) = read_optional(path)?
        {
            lib.system_prompt = Some(text);
        }

        for (kind, path) in [
            (PromptTemplate::ErrorAnalysis, &paths.error_analysis),
            (PromptTemplate::ResourceAnalysis, &paths.resource_analysis),
        ] {
            if let Some(path) = path
                && let Some(source) = read_optional(path)?
            {
                lib = lib.with_template(kind, &source).map_err(|e| {
                    AiError::Template(format!("{} ({}): {e}", kind.name(), path.display()))
                })?;
            }
        }

        tracing::info!(
            system_prompt = lib.system_prompt.is_some(),
            error_analysis = lib.has_template(PromptTemplate::ErrorAnalysis),
            resource_analysis = lib.has_template(PromptTemplate::ResourceAnalysis),
            "prompt templates loaded"
        );
        Ok(lib)
    }

    #[must_use]
    pub fn with_system_prompt(mut self, text: impl Into<String>) -> Self {
        self.system_prompt = Some(text.into());
        self
    }

    /// # Errors
    ///
    /// Returns an error if `source` is not a valid template.
    pub fn with_template(mut self, kind: PromptTemplate, source: &str) -> Result<Self> {
        self.tera.add_raw_template(kind.name(), source)?;
        Ok(self)
    }

    /// The loaded system prompt, or [`DEFAULT_SYSTEM_PROMPT`].
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    #[must_use]
    pub fn has_template(&self, kind: PromptTemplate) -> bool {
        self.tera.get_template_names().any(|n| n == kind.name())
    }

    /// Render a template. `Ok(None)` when that template was never loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails (e.g. the template references an unknown variable).
    pub fn render(&self, kind: PromptTemplate, ctx: &tera::Context) -> Result<Option<String>> {
        if !self.has_template(kind) {
            return Ok(None);
        }
        Ok(Some(self.tera.render(kind.name(), ctx)?))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "prompt file not found; AI calls using it will fall back to standard text"
            );
            Ok(None)
        }
        Err(e) => Err(AiError::Config(format!(
            "read prompt file {}: {e}",
            path.display()
        ))),
    }
}
