//! The tool operations, independent of the MCP transport.
//!
//! A [`Toolbox`] is built once from [`Settings`] and shared read-only by every session.

use crate::config::Settings;
use crate::outcome::{ErrorRecord, TextOutcome, ToolOutcome};
use anyhow::Context as _;
use hero_ai_tools::{
    CompletionClient, ErrorDetails, OpenAiChatClient, PromptLibrary, TroubleshootingAgent,
};
use hero_azure_tools::credential::credential_from_settings;
use hero_azure_tools::models::{
    DeploymentDiagnosis, NetworkReport, ResourceInventory, ResourceSummary,
};
use hero_azure_tools::{ArmClient, AzureManager};
use serde::Serialize;
use std::sync::Arc;

pub const MISSING_SUBSCRIPTION: &str = "Azure subscription ID not configured";
pub const MISSING_OPENAI_KEY: &str = "OpenAI API key not configured";
pub const NO_RESOURCE_GROUPS: &str = "No resource groups found";

#[derive(Debug, Clone, Serialize)]
pub struct ResourceData {
    #[serde(flatten)]
    pub inventory: ResourceInventory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_resources: Option<Vec<ResourceSummary>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceAnalysis {
    pub resource_group: String,
    pub analysis: String,
    pub resource_data: ResourceData,
    pub next_steps: Vec<String>,
    pub ai_powered: bool,
}

#[derive(Clone)]
pub struct Toolbox {
    azure: Option<AzureManager>,
    agent: TroubleshootingAgent,
}

impl Toolbox {
    /// Wire up the Azure and completion backends described by `settings`.
    ///
    /// A missing subscription or API key is not an error: the affected tools report it per call.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid endpoints, unreadable or invalid prompt templates, or an
    /// outbound client that cannot be built.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = settings
            .outbound_options()
            .build()
            .context("build outbound HTTP client")?;

        let azure = match settings.subscription_id() {
            Some(subscription_id) => {
                let credential = credential_from_settings(
                    http.clone(),
                    &settings.credential_settings(),
                    &settings.azure_resource_manager_endpoint,
                )
                .context("configure Azure credential")?;
                let arm = ArmClient::new(
                    http.clone(),
                    &settings.azure_resource_manager_endpoint,
                    subscription_id,
                    credential,
                )
                .context("configure Azure Resource Manager client")?;
                Some(AzureManager::new(arm))
            }
            None => {
                tracing::warn!("AZURE_SUBSCRIPTION_ID is not set; Azure tools will report it");
                None
            }
        };

        let client: Option<Arc<dyn CompletionClient>> = match settings.openai_api_key() {
            Some(key) => Some(Arc::new(
                OpenAiChatClient::new(
                    http,
                    &settings.openai_base_url,
                    key,
                    settings.openai_model.clone(),
                )
                .context("configure completion client")?,
            )),
            None => {
                tracing::warn!("OPENAI_API_KEY is not set; AI analysis disabled");
                None
            }
        };

        let prompts =
            PromptLibrary::load(&settings.prompt_paths()).context("load prompt templates")?;

        Ok(Self::from_parts(
            azure,
            TroubleshootingAgent::new(client, Arc::new(prompts)),
        ))
    }

    #[must_use]
    pub fn from_parts(azure: Option<AzureManager>, agent: TroubleshootingAgent) -> Self {
        Self { azure, agent }
    }

    #[must_use]
    pub fn azure_configured(&self) -> bool {
        self.azure.is_some()
    }

    #[must_use]
    pub fn ai_configured(&self) -> bool {
        self.agent.is_ai_enabled()
    }

    #[must_use]
    pub fn hello_world(&self, name: Option<&str>) -> String {
        let name = name.unwrap_or("World");
        tracing::info!(name, "hello_world");
        format!("Hello, {name}! Welcome to the Hero of the Day MCP server!")
    }

    pub async fn get_azure_resource_groups(&self) -> TextOutcome {
        tracing::info!("get_azure_resource_groups");
        let Some(azure) = &self.azure else {
            return TextOutcome::failure(MISSING_SUBSCRIPTION);
        };

        match azure.list_resource_groups().await {
            Ok(names) if names.is_empty() => {
                TextOutcome::Success(serde_json::json!([NO_RESOURCE_GROUPS]).to_string())
            }
            Ok(names) => TextOutcome::Success(serde_json::Value::from(names).to_string()),
            Err(e) => {
                tracing::error!(error = %e, "failed to list resource groups");
                TextOutcome::failure(e)
            }
        }
    }

    pub async fn analyze_deployment_error(
        &self,
        deployment_name: &str,
        resource_group: &str,
        include_ai_analysis: bool,
    ) -> ToolOutcome<DeploymentDiagnosis> {
        tracing::info!(
            deployment_name,
            resource_group,
            include_ai_analysis,
            "analyze_deployment_error"
        );
        let Some(azure) = &self.azure else {
            return ToolOutcome::Failure(ErrorRecord::new(MISSING_SUBSCRIPTION));
        };

        let mut diagnosis = match azure
            .diagnose_deployment_error(deployment_name, resource_group)
            .await
        {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    deployment_name,
                    resource_group,
                    "deployment lookup failed"
                );
                return ToolOutcome::Failure(ErrorRecord::new(e));
            }
        };

        if include_ai_analysis {
            let details = ErrorDetails::from(&diagnosis);
            diagnosis.ai_analysis = Some(self.agent.analyze_deployment_error(&details).await.text);
        }
        ToolOutcome::Success(diagnosis)
    }

    /// `error_details` may be a JSON error-details object or a free-form description.
    pub async fn get_ai_troubleshooting_advice(&self, error_details: &str) -> TextOutcome {
        tracing::info!(chars = error_details.len(), "get_ai_troubleshooting_advice");
        if !self.agent.is_ai_enabled() {
            return TextOutcome::failure(MISSING_OPENAI_KEY);
        }

        let details = parse_error_details(error_details);
        TextOutcome::Success(self.agent.analyze_deployment_error(&details).await.text)
    }

    pub async fn get_network_issues(&self, resource_group: &str) -> ToolOutcome<NetworkReport> {
        tracing::info!(resource_group, "get_network_issues");
        let Some(azure) = &self.azure else {
            return ToolOutcome::Failure(ErrorRecord::new(MISSING_SUBSCRIPTION));
        };

        match azure.get_network_issues(resource_group).await {
            Ok(report) => ToolOutcome::Success(report),
            Err(e) => {
                tracing::error!(error = %e, resource_group, "network inspection failed");
                ToolOutcome::Failure(ErrorRecord::new(e))
            }
        }
    }

    pub async fn list_resources_in_group(
        &self,
        resource_group: &str,
    ) -> ToolOutcome<ResourceInventory> {
        tracing::info!(resource_group, "list_resources_in_group");
        match self.inventory(resource_group).await {
            Ok(inventory) => ToolOutcome::Success(inventory),
            Err(record) => ToolOutcome::Failure(record),
        }
    }

    pub async fn analyze_resources_with_ai(
        &self,
        resource_group: &str,
        include_network: bool,
    ) -> ToolOutcome<ResourceAnalysis> {
        tracing::info!(resource_group, include_network, "analyze_resources_with_ai");
        let inventory = match self.inventory(resource_group).await {
            Ok(inventory) => inventory,
            Err(record) => return ToolOutcome::Failure(record),
        };

        let network = include_network.then(|| inventory.network_resources());
        let analysis = self
            .agent
            .analyze_resources(&inventory, network.as_deref())
            .await;

        ToolOutcome::Success(ResourceAnalysis {
            resource_group: resource_group.to_string(),
            analysis: analysis.text,
            resource_data: ResourceData {
                inventory,
                network_resources: network,
            },
            next_steps: self.agent.suggest_next_steps(),
            ai_powered: analysis.ai_powered,
        })
    }

    async fn inventory(&self, resource_group: &str) -> Result<ResourceInventory, ErrorRecord> {
        let Some(azure) = &self.azure else {
            return Err(ErrorRecord::new(MISSING_SUBSCRIPTION));
        };
        azure
            .list_resources_in_group(resource_group)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, resource_group, "resource listing failed");
                ErrorRecord::for_group(e, resource_group)
            })
    }
}

/// JSON objects with none of the known keys are treated as prose so the caller's text survives.
fn parse_error_details(raw: &str) -> ErrorDetails {
    let trimmed = raw.trim();
    if trimmed.starts_with('{')
        && let Ok(details) = serde_json::from_str::<ErrorDetails>(trimmed)
        && details != ErrorDetails::default()
    {
        return details;
    }
    ErrorDetails::from_description(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::{Json, Router, routing::get};
    use hero_ai_tools::PromptTemplate;
    use hero_azure_tools::credential::StaticTokenCredential;
    use hero_test_support::MockHttpServer;
    use serde_json::json;

    struct EchoClient;

    #[async_trait]
    impl CompletionClient for EchoClient {
        fn model(&self) -> &str {
            "echo"
        }

        async fn complete(&self, _system: &str, user: &str) -> hero_ai_tools::Result<String> {
            Ok(format!("AI says: {user}"))
        }
    }

    fn agent(
        client: Option<Arc<dyn CompletionClient>>,
        library: PromptLibrary,
    ) -> TroubleshootingAgent {
        TroubleshootingAgent::new(client, Arc::new(library))
    }

    fn unconfigured() -> Toolbox {
        Toolbox::from_parts(None, agent(None, PromptLibrary::empty()))
    }

    fn arm_app() -> Router {
        Router::new()
            .route(
                "/subscriptions/sub-1/resourcegroups",
                get(|| async { Json(json!({ "value": [] })) }),
            )
            .route(
                "/subscriptions/sub-1/resourceGroups/app-rg/resources",
                get(|| async {
                    Json(json!({
                        "value": [
                            { "id": "/r/vm1", "name": "vm1", "type": "Microsoft.Compute/virtualMachines", "location": "eastus" },
                            { "id": "/r/nsg1", "name": "nsg1", "type": "Microsoft.Network/networkSecurityGroups", "location": "eastus" }
                        ]
                    }))
                }),
            )
            .route(
                "/subscriptions/sub-1/resourceGroups/gone-rg/resources",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({"error": {"code": "ResourceGroupNotFound", "message": "Resource group 'gone-rg' could not be found."}})),
                    )
                }),
            )
            .route(
                "/subscriptions/sub-1/resourcegroups/app-rg/providers/Microsoft.Resources/deployments/web",
                get(|| async {
                    Json(json!({
                        "name": "web",
                        "properties": {
                            "provisioningState": "Failed",
                            "timestamp": "2024-01-01T00:00:00Z",
                            "error": { "code": "DeploymentFailed", "message": "subnet in use" }
                        }
                    }))
                }),
            )
    }

    async fn configured(agent: TroubleshootingAgent) -> (MockHttpServer, Toolbox) {
        let server = MockHttpServer::start(arm_app()).await.expect("mock");
        let arm = ArmClient::new(
            reqwest::Client::new(),
            server.base_url(),
            "sub-1",
            Arc::new(StaticTokenCredential::new("t")),
        )
        .expect("arm client");
        (server, Toolbox::from_parts(Some(AzureManager::new(arm)), agent))
    }

    #[test]
    fn hello_world_defaults_to_world() {
        let tools = unconfigured();
        assert!(tools.hello_world(None).contains("World"));
        assert_eq!(
            tools.hello_world(Some("Ada")),
            "Hello, Ada! Welcome to the Hero of the Day MCP server!"
        );
    }

    #[tokio::test]
    async fn azure_tools_without_subscription_return_errors() {
        let tools = unconfigured();

        assert_eq!(
            tools.get_azure_resource_groups().await.text(),
            "Error: Azure subscription ID not configured"
        );
        let missing = ErrorRecord::new(MISSING_SUBSCRIPTION);
        assert_eq!(
            tools.analyze_deployment_error("d", "rg", true).await,
            ToolOutcome::Failure(missing.clone())
        );
        assert_eq!(
            tools.get_network_issues("rg").await,
            ToolOutcome::Failure(missing.clone())
        );
        assert!(tools.list_resources_in_group("rg").await.is_failure());
        assert!(tools.analyze_resources_with_ai("rg", true).await.is_failure());
    }

    #[tokio::test]
    async fn advice_without_key_is_the_fixed_literal() {
        let tools = unconfigured();
        let out = tools.get_ai_troubleshooting_advice("anything").await;
        assert_eq!(
            out,
            TextOutcome::Failure("Error: OpenAI API key not configured".to_string())
        );
    }

    #[tokio::test]
    async fn advice_without_template_uses_fallback_with_record_fields() {
        let tools = Toolbox::from_parts(
            None,
            agent(Some(Arc::new(EchoClient)), PromptLibrary::empty()),
        );
        let out = tools
            .get_ai_troubleshooting_advice(
                r#"{"deployment_state":"Failed","timestamp":"2024-01-01T00:00:00Z"}"#,
            )
            .await;
        let TextOutcome::Success(text) = out else {
            panic!("expected success");
        };
        assert!(text.contains("Failed"));
        assert!(text.contains("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn advice_with_template_returns_model_text() {
        let library = PromptLibrary::empty()
            .with_template(PromptTemplate::ErrorAnalysis, "{{ message }}")
            .expect("template");
        let tools = Toolbox::from_parts(None, agent(Some(Arc::new(EchoClient)), library));
        let out = tools.get_ai_troubleshooting_advice("dns lookups time out").await;
        assert_eq!(out.text(), "AI says: dns lookups time out");
    }

    #[tokio::test]
    async fn empty_subscription_lists_placeholder() {
        let (_server, tools) = configured(agent(None, PromptLibrary::empty())).await;
        assert_eq!(
            tools.get_azure_resource_groups().await,
            TextOutcome::Success(r#"["No resource groups found"]"#.to_string())
        );
    }

    #[tokio::test]
    async fn inventory_and_failure_records() -> anyhow::Result<()> {
        let (_server, tools) = configured(agent(None, PromptLibrary::empty())).await;

        let ToolOutcome::Success(inv) = tools.list_resources_in_group("app-rg").await else {
            panic!("expected inventory");
        };
        assert_eq!(inv.resource_count(), inv.resources().len());
        assert_eq!(inv.resource_count(), 2);

        let ToolOutcome::Failure(record) = tools.list_resources_in_group("gone-rg").await else {
            panic!("expected failure");
        };
        assert_eq!(record.resource_group.as_deref(), Some("gone-rg"));
        assert!(record.error.contains("ResourceGroupNotFound"), "{}", record.error);
        Ok(())
    }

    #[tokio::test]
    async fn deployment_diagnosis_with_fallback_analysis() {
        let (_server, tools) = configured(agent(None, PromptLibrary::empty())).await;

        let ToolOutcome::Success(diag) =
            tools.analyze_deployment_error("web", "app-rg", true).await
        else {
            panic!("expected diagnosis");
        };
        assert_eq!(diag.deployment_state, "Failed");
        let analysis = diag.ai_analysis.expect("analysis");
        assert!(analysis.contains("State: Failed"));
        assert!(analysis.contains("Details: subnet in use"));

        let ToolOutcome::Success(plain) =
            tools.analyze_deployment_error("web", "app-rg", false).await
        else {
            panic!("expected diagnosis");
        };
        assert_eq!(plain.ai_analysis, None);
    }

    #[tokio::test]
    async fn resource_analysis_without_key_is_not_ai_powered() -> anyhow::Result<()> {
        let (_server, tools) = configured(agent(None, PromptLibrary::empty())).await;

        let ToolOutcome::Success(analysis) = tools.analyze_resources_with_ai("app-rg", true).await
        else {
            panic!("expected analysis");
        };
        assert!(!analysis.ai_powered);
        assert!(analysis.analysis.contains("Total resources: 2"));
        assert_eq!(analysis.next_steps.len(), 5);

        let v = serde_json::to_value(&analysis)?;
        assert_eq!(v["resource_data"]["resource_count"], json!(2));
        assert_eq!(v["resource_data"]["network_resources"][0]["name"], json!("nsg1"));
        Ok(())
    }

    #[tokio::test]
    async fn resource_analysis_with_model() {
        let library = PromptLibrary::empty()
            .with_template(
                PromptTemplate::ResourceAnalysis,
                "{{ resource_count }} in {{ resource_group }}",
            )
            .expect("template");
        let (_server, tools) = configured(agent(Some(Arc::new(EchoClient)), library)).await;

        let ToolOutcome::Success(analysis) = tools.analyze_resources_with_ai("app-rg", false).await
        else {
            panic!("expected analysis");
        };
        assert!(analysis.ai_powered);
        assert_eq!(analysis.analysis, "AI says: 2 in app-rg");
        assert!(analysis.resource_data.network_resources.is_none());
    }

    #[test]
    fn error_details_accepts_json_or_prose() {
        let d = parse_error_details(r#"{"deployment_state":"Failed"}"#);
        assert_eq!(d.deployment_state.as_deref(), Some("Failed"));

        let d = parse_error_details("{ not json");
        assert_eq!(d.message.as_deref(), Some("{ not json"));
    }

    #[test]
    fn error_details_keeps_text_of_unrecognized_objects() {
        let d = parse_error_details(r#"{"description":"NSG nsg-web blocks port 443"}"#);
        assert_eq!(d.message.as_deref(), Some("NSG nsg-web blocks port 443"));

        let raw = r#"{"status":"Conflict","details":"subnet-a in use"}"#;
        let d = parse_error_details(raw);
        assert_eq!(d.message.as_deref(), Some(raw));
        assert_eq!(d.deployment_state, None);
    }

    #[tokio::test]
    async fn advice_keeps_description_object_text() {
        let library = PromptLibrary::empty()
            .with_template(
                PromptTemplate::ErrorAnalysis,
                "{{ message }} | {{ deployment_state }}",
            )
            .expect("template");
        let tools = Toolbox::from_parts(None, agent(Some(Arc::new(EchoClient)), library));
        let out = tools
            .get_ai_troubleshooting_advice(r#"{"description":"NSG nsg-web blocks port 443"}"#)
            .await;
        assert_eq!(out.text(), "AI says: NSG nsg-web blocks port 443 | Unknown");

        let fallback = Toolbox::from_parts(
            None,
            agent(Some(Arc::new(EchoClient)), PromptLibrary::empty()),
        );
        let out = fallback
            .get_ai_troubleshooting_advice(r#"{"details":"nsg-web denies inbound 443"}"#)
            .await;
        assert!(out.text().contains("nsg-web"), "{}", out.text());
    }
}
