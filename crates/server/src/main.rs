use anyhow::Context as _;
use hero_mcp_server::config::{Cli, Command, Settings};
use hero_mcp_server::tools::Toolbox;
use hero_mcp_server::{http, telemetry};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::load();

    match cli.command.unwrap_or(Command::Serve) {
        Command::CheckConfig => Ok(check_config(&cli.settings)),
        Command::Serve => {
            telemetry::init(&cli.settings)?;
            let settings = cli.settings;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                azure_configured = settings.azure_configured(),
                ai_configured = settings.ai_configured(),
                model = %settings.openai_model,
                "starting hero MCP server"
            );
            let tools = Toolbox::from_settings(&settings).context("initialize tools")?;
            http::serve(settings.bind, tools).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check_config(settings: &Settings) -> ExitCode {
    let missing = settings.missing_required();
    if missing.is_empty() {
        println!("configuration OK");
        return ExitCode::SUCCESS;
    }
    println!("missing required configuration:");
    for name in &missing {
        println!("  - {name}");
    }
    ExitCode::FAILURE
}
