//! MCP surface: tool schemas and routing onto [`Toolbox`].

use crate::tools::Toolbox;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HelloArgs {
    /// Who to greet (defaults to "World")
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeploymentArgs {
    /// Name of the ARM deployment
    pub deployment_name: String,
    /// Resource group containing the deployment
    pub resource_group: String,
    /// Also generate troubleshooting text for the deployment's error
    #[serde(default)]
    pub include_ai_analysis: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AdviceArgs {
    /// Error description, or a JSON object with deployment_state, timestamp, message, etc.
    pub error_details: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResourceGroupArgs {
    /// Name of the resource group
    pub resource_group: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResourceAnalysisArgs {
    /// Name of the resource group
    pub resource_group: String,
    /// Include the group's network resources in the analysis
    #[serde(default)]
    pub include_network: bool,
}

#[derive(Clone)]
pub struct HeroServer {
    tools: Toolbox,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl HeroServer {
    #[must_use]
    pub fn new(tools: Toolbox) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Say hello; useful for checking the server is reachable")]
    async fn hello_world(
        &self,
        Parameters(args): Parameters<HelloArgs>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.tools.hello_world(args.name.as_deref());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List the resource groups in the configured Azure subscription")]
    async fn get_azure_resource_groups(&self) -> Result<CallToolResult, McpError> {
        Ok(self.tools.get_azure_resource_groups().await.into_call_result())
    }

    #[tool(
        description = "Report an ARM deployment's state, error and timestamp, optionally with troubleshooting analysis"
    )]
    async fn analyze_deployment_error(
        &self,
        Parameters(args): Parameters<DeploymentArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .tools
            .analyze_deployment_error(
                &args.deployment_name,
                &args.resource_group,
                args.include_ai_analysis,
            )
            .await
            .into_call_result())
    }

    #[tool(description = "Get AI-generated troubleshooting advice for an Azure error")]
    async fn get_ai_troubleshooting_advice(
        &self,
        Parameters(args): Parameters<AdviceArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .tools
            .get_ai_troubleshooting_advice(&args.error_details)
            .await
            .into_call_result())
    }

    #[tool(description = "List the network resources in a resource group for further analysis")]
    async fn get_network_issues(
        &self,
        Parameters(args): Parameters<ResourceGroupArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .tools
            .get_network_issues(&args.resource_group)
            .await
            .into_call_result())
    }

    #[tool(description = "List all resources in a resource group with their type and location")]
    async fn list_resources_in_group(
        &self,
        Parameters(args): Parameters<ResourceGroupArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .tools
            .list_resources_in_group(&args.resource_group)
            .await
            .into_call_result())
    }

    #[tool(
        description = "Summarize a resource group's resources, with AI analysis when configured"
    )]
    async fn analyze_resources_with_ai(
        &self,
        Parameters(args): Parameters<ResourceAnalysisArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .tools
            .analyze_resources_with_ai(&args.resource_group, args.include_network)
            .await
            .into_call_result())
    }
}

#[tool_handler]
impl ServerHandler for HeroServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = "hero-of-the-day".to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(
            "Hero of the Day: Azure troubleshooting tools.\n\n\
             - get_azure_resource_groups, list_resources_in_group and get_network_issues inspect \
             the configured subscription.\n\
             - analyze_deployment_error reports a deployment's state and error.\n\
             - get_ai_troubleshooting_advice and analyze_resources_with_ai produce troubleshooting \
             text; without an OpenAI key or prompt templates they return standard guidance.\n\n\
             Failures are returned as values: an `error` field or text starting with `Error:`."
                .into(),
        );
        info
    }
}
