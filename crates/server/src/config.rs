//! Process configuration.
//!
//! Every value comes from a CLI flag or its environment variable; a `.env` file in the working
//! directory is loaded first (see [`Cli::load`]). Empty strings count as unset.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use hero_ai_tools::PromptPaths;
use hero_ai_tools::completion::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL};
use hero_azure_tools::arm::DEFAULT_RESOURCE_MANAGER_ENDPOINT;
use hero_azure_tools::credential::{CredentialSettings, DEFAULT_AUTHORITY_HOST};
use hero_http_tools::client::OutboundClientOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Parser)]
#[command(name = "hero-mcp-server")]
#[command(about = "MCP server for Azure resource inspection and AI troubleshooting advice")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Load `.env` (if present), then parse flags and environment.
    #[must_use]
    pub fn load() -> Self {
        // Runs before logging is configured.
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            eprintln!("warning: failed to load .env: {e}");
        }
        Self::parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the MCP server (default)
    Serve,
    /// Report missing required configuration and exit non-zero if any is missing
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Azure subscription to inspect
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub azure_subscription_id: Option<String>,

    #[arg(long, env = "AZURE_TENANT_ID")]
    pub azure_tenant_id: Option<String>,

    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub azure_client_id: Option<String>,

    #[arg(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub azure_client_secret: Option<String>,

    /// Pre-acquired ARM bearer token; used instead of the client secret when set
    #[arg(long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub azure_access_token: Option<String>,

    #[arg(long, env = "AZURE_AUTHORITY_HOST", default_value = DEFAULT_AUTHORITY_HOST)]
    pub azure_authority_host: String,

    #[arg(
        long,
        env = "AZURE_RESOURCE_MANAGER_ENDPOINT",
        default_value = DEFAULT_RESOURCE_MANAGER_ENDPOINT
    )]
    pub azure_resource_manager_endpoint: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// OpenAI-compatible API base (must include the version segment, e.g. `/v1`)
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Force debug logging
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub debug: bool,

    /// Default log filter when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, env = "HERO_MCP_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    #[arg(long, env = "HERO_MCP_SYSTEM_PROMPT", default_value = "prompts/system_prompt.md")]
    pub system_prompt: PathBuf,

    #[arg(
        long,
        env = "HERO_MCP_ERROR_ANALYSIS_TEMPLATE",
        default_value = "prompts/error_analysis.md"
    )]
    pub error_analysis_template: PathBuf,

    #[arg(
        long,
        env = "HERO_MCP_RESOURCE_ANALYSIS_TEMPLATE",
        default_value = "prompts/resource_analysis.md"
    )]
    pub resource_analysis_template: PathBuf,

    /// Accept invalid TLS certificates on outbound Azure/OpenAI requests
    #[arg(
        long,
        env = "HERO_MCP_INSECURE_SKIP_TLS_VERIFY",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub insecure_skip_tls_verify: bool,

    /// Whole-request timeout for outbound calls; unset or 0 waits indefinitely
    #[arg(long, env = "HERO_MCP_OUTBOUND_TIMEOUT_SECS")]
    pub outbound_timeout_secs: Option<u64>,
}

impl Settings {
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        non_empty(self.azure_subscription_id.as_deref())
    }

    #[must_use]
    pub fn openai_api_key(&self) -> Option<&str> {
        non_empty(self.openai_api_key.as_deref())
    }

    #[must_use]
    pub fn azure_configured(&self) -> bool {
        self.subscription_id().is_some()
    }

    #[must_use]
    pub fn ai_configured(&self) -> bool {
        self.openai_api_key().is_some()
    }

    /// Required variables that are unset, in a stable order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.azure_configured() {
            missing.push(ENV_SUBSCRIPTION_ID);
        }
        if !self.ai_configured() {
            missing.push(ENV_OPENAI_API_KEY);
        }
        missing
    }

    #[must_use]
    pub fn credential_settings(&self) -> CredentialSettings {
        CredentialSettings {
            tenant_id: self.azure_tenant_id.clone(),
            client_id: self.azure_client_id.clone(),
            client_secret: self.azure_client_secret.clone(),
            access_token: self.azure_access_token.clone(),
            authority_host: Some(self.azure_authority_host.clone()),
        }
    }

    #[must_use]
    pub fn prompt_paths(&self) -> PromptPaths {
        PromptPaths {
            system_prompt: Some(self.system_prompt.clone()),
            error_analysis: Some(self.error_analysis_template.clone()),
            resource_analysis: Some(self.resource_analysis_template.clone()),
        }
    }

    #[must_use]
    pub fn outbound_options(&self) -> OutboundClientOptions {
        OutboundClientOptions {
            insecure_skip_tls_verify: self.insecure_skip_tls_verify,
            timeout: self.outbound_timeout_secs.map(Duration::from_secs),
            user_agent: Some(format!("hero-mcp-server/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}
