use anyhow::Context as _;
use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;

pub use hero_test_support::{KillOnDrop, MockHttpServer};

/// Variables the server reads; cleared so the host environment cannot leak into a test.
const SERVER_ENV: &[&str] = &[
    "AZURE_SUBSCRIPTION_ID",
    "AZURE_TENANT_ID",
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
    "AZURE_ACCESS_TOKEN",
    "AZURE_AUTHORITY_HOST",
    "AZURE_RESOURCE_MANAGER_ENDPOINT",
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "OPENAI_BASE_URL",
    "DEBUG",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "RUST_LOG",
    "HERO_MCP_BIND",
    "HERO_MCP_SYSTEM_PROMPT",
    "HERO_MCP_ERROR_ANALYSIS_TEMPLATE",
    "HERO_MCP_RESOURCE_ANALYSIS_TEMPLATE",
    "HERO_MCP_INSECURE_SKIP_TLS_VERIFY",
    "HERO_MCP_OUTBOUND_TIMEOUT_SECS",
];

pub fn server_command(workdir: &Path, env: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hero-mcp-server"));
    cmd.current_dir(workdir);
    for key in SERVER_ENV {
        cmd.env_remove(key);
    }
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd
}

pub fn spawn_server(workdir: &Path, port: u16, env: &[(&str, &str)]) -> anyhow::Result<Child> {
    server_command(workdir, env)
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info")
        .spawn()
        .context("spawn hero-mcp-server")
}

/// Start the server and wait for `/health`. Returns its base URL.
pub async fn start_server(
    workdir: &Path,
    env: &[(&str, &str)],
) -> anyhow::Result<(String, KillOnDrop)> {
    let port = hero_test_support::pick_unused_port()?;
    let child = KillOnDrop(spawn_server(workdir, port, env)?);

    let base_url = format!("http://127.0.0.1:{port}");
    hero_test_support::wait_http_ok(&format!("{base_url}/health"), Duration::from_secs(20))
        .await?;
    Ok((base_url, child))
}
