use crate::completion::CompletionClient;
use crate::details::ErrorDetails;
use crate::error::{AiError, Result};
use crate::fallback;
use crate::prompts::{PromptLibrary, PromptTemplate};
use hero_azure_tools::models::{ResourceInventory, ResourceSummary};
use serde::Serialize;
use std::sync::Arc;

const NO_CLIENT_NOTE: &str =
    "AI analysis unavailable: OpenAI API key not configured. Showing standard summary.";

/// Analysis text plus whether a language model produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisText {
    pub text: String,
    pub ai_powered: bool,
}

impl AnalysisText {
    fn ai(text: String) -> Self {
        Self {
            text,
            ai_powered: true,
        }
    }

    fn standard(text: String) -> Self {
        Self {
            text,
            ai_powered: false,
        }
    }
}

#[derive(Clone)]
pub struct TroubleshootingAgent {
    client: Option<Arc<dyn CompletionClient>>,
    prompts: Arc<PromptLibrary>,
}

impl TroubleshootingAgent {
    #[must_use]
    pub fn new(client: Option<Arc<dyn CompletionClient>>, prompts: Arc<PromptLibrary>) -> Self {
        Self { client, prompts }
    }

    #[must_use]
    pub fn is_ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Troubleshooting text for a failed deployment. Never fails.
    ///
    /// Uses the completion backend when both a client and the error-analysis template are
    /// available; otherwise, or if the backend call fails, returns the standard analysis.
    pub async fn analyze_deployment_error(&self, details: &ErrorDetails) -> AnalysisText {
        let Some(client) = &self.client else {
            return AnalysisText::standard(fallback::deployment_analysis(details));
        };

        match self
            .ask(
                client.as_ref(),
                PromptTemplate::ErrorAnalysis,
                &details.template_context(),
            )
            .await
        {
            Ok(Some(text)) => AnalysisText::ai(text),
            Ok(None) => AnalysisText::standard(fallback::deployment_analysis(details)),
            Err(e) => {
                tracing::error!(error = %e, "deployment analysis fell back to standard guidance");
                AnalysisText::standard(format!(
                    "AI analysis unavailable ({e}); showing standard guidance.\n\n{}",
                    fallback::deployment_analysis(details)
                ))
            }
        }
    }

    /// Summary of a resource group, optionally with its network resources listed.
    ///
    /// Same degradation rules as [`Self::analyze_deployment_error`].
    pub async fn analyze_resources(
        &self,
        inventory: &ResourceInventory,
        network: Option<&[ResourceSummary]>,
    ) -> AnalysisText {
        let standard = || fallback::resource_summary(inventory, network);
        let Some(client) = &self.client else {
            return AnalysisText::standard(format!("{NO_CLIENT_NOTE}\n\n{}", standard()));
        };

        let ctx = match resource_context(inventory, network) {
            Ok(ctx) => ctx,
            Err(e) => return AnalysisText::standard(format!("{e}\n\n{}", standard())),
        };

        match self
            .ask(client.as_ref(), PromptTemplate::ResourceAnalysis, &ctx)
            .await
        {
            Ok(Some(text)) => AnalysisText::ai(text),
            Ok(None) => AnalysisText::standard(standard()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    resource_group = inventory.resource_group(),
                    "resource analysis fell back to standard summary"
                );
                AnalysisText::standard(format!(
                    "AI analysis unavailable ({e}); showing standard summary.\n\n{}",
                    standard()
                ))
            }
        }
    }

    #[must_use]
    pub fn suggest_next_steps(&self) -> Vec<String> {
        fallback::suggest_next_steps()
    }

    /// `Ok(None)` when the template slot is empty; the backend is not called in that case.
    async fn ask(
        &self,
        client: &dyn CompletionClient,
        kind: PromptTemplate,
        ctx: &tera::Context,
    ) -> Result<Option<String>> {
        let Some(prompt) = self.prompts.render(kind, ctx)? else {
            tracing::debug!(template = kind.name(), "no template loaded; skipping completion");
            return Ok(None);
        };
        tracing::debug!(template = kind.name(), model = client.model(), "requesting analysis");
        client
            .complete(self.prompts.system_prompt(), &prompt)
            .await
            .map(Some)
    }
}

fn resource_context(
    inventory: &ResourceInventory,
    network: Option<&[ResourceSummary]>,
) -> Result<tera::Context> {
    let to_json = |v: &[ResourceSummary]| {
        serde_json::to_string_pretty(v).map_err(|e| AiError::Template(e.to_string()))
    };

    let mut ctx = tera::Context::new();
    ctx.insert("resource_group", inventory.resource_group());
    ctx.insert("resource_count", &inventory.resource_count());
    ctx.insert("resources", &to_json(inventory.resources())?);
    ctx.insert("include_network", &network.is_some());
    ctx.insert("network_resources", &to_json(network.unwrap_or_default())?);
    Ok(ctx)
}
