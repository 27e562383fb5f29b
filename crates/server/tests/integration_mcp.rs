mod common;
mod common_mcp;

use anyhow::Context as _;
use axum::{Json, Router, routing::get, routing::post};
use serde_json::{Value, json};
use tempfile::tempdir;

use common::{MockHttpServer, server_command, start_server};
use common_mcp::{McpSession, result_is_error, result_structured, result_text};

fn mock_arm() -> Router {
    Router::new()
        .route(
            "/subscriptions/sub-it/resourcegroups",
            get(|| async { Json(json!({ "value": [{ "name": "rg-a" }, { "name": "rg-b" }] })) }),
        )
        .route(
            "/subscriptions/sub-it/resourceGroups/rg-a/resources",
            get(|| async {
                Json(json!({
                    "value": [
                        { "id": "/r/vnet", "name": "vnet", "type": "Microsoft.Network/virtualNetworks", "location": "westus" },
                        { "id": "/r/app", "name": "app", "type": "Microsoft.Web/sites", "location": "westus" }
                    ]
                }))
            }),
        )
}

fn mock_openai() -> Router {
    Router::new().route(
        "/v1/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let prompt = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": format!("model: {prompt}") } }]
            }))
        }),
    )
}

#[tokio::test]
async fn unconfigured_server_answers_every_tool_with_values() -> anyhow::Result<()> {
    let dir = tempdir().context("create temp dir")?;
    let (base_url, _server) = start_server(dir.path(), &[]).await?;

    let health: Value = reqwest::get(format!("{base_url}/health")).await?.json().await?;
    assert_eq!(health["azure_configured"], json!(false));
    assert_eq!(health["ai_configured"], json!(false));

    let session = McpSession::connect(&base_url).await?;

    let tools = session.request("tools/list", json!({})).await?;
    let mut names: Vec<&str> = tools["result"]["tools"]
        .as_array()
        .context("tools array")?
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "analyze_deployment_error",
            "analyze_resources_with_ai",
            "get_ai_troubleshooting_advice",
            "get_azure_resource_groups",
            "get_network_issues",
            "hello_world",
            "list_resources_in_group",
        ]
    );

    let hello = session.call_tool("hello_world", json!({})).await?;
    assert!(result_text(&hello)?.contains("World"));

    let groups = session.call_tool("get_azure_resource_groups", json!({})).await?;
    assert_eq!(
        result_text(&groups)?,
        "Error: Azure subscription ID not configured"
    );

    let advice = session
        .call_tool(
            "get_ai_troubleshooting_advice",
            json!({ "error_details": "deployment timed out" }),
        )
        .await?;
    assert_eq!(result_text(&advice)?, "Error: OpenAI API key not configured");

    for (tool, args) in [
        ("get_network_issues", json!({ "resource_group": "rg" })),
        ("list_resources_in_group", json!({ "resource_group": "rg" })),
        (
            "analyze_deployment_error",
            json!({ "deployment_name": "d", "resource_group": "rg" }),
        ),
        ("analyze_resources_with_ai", json!({ "resource_group": "rg" })),
    ] {
        let res = session.call_tool(tool, args).await?;
        assert!(result_is_error(&res), "{tool}: {res}");
        assert_eq!(
            result_structured(&res)?["error"],
            json!("Azure subscription ID not configured"),
            "{tool}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn configured_server_reads_arm_and_completion_backends() -> anyhow::Result<()> {
    let arm = MockHttpServer::start(mock_arm()).await?;
    let openai = MockHttpServer::start(mock_openai()).await?;

    let dir = tempdir().context("create temp dir")?;
    std::fs::create_dir(dir.path().join("prompts"))?;
    std::fs::write(
        dir.path().join("prompts/error_analysis.md"),
        "Explain: {{ message }}",
    )?;

    let openai_base = openai.url("/v1");
    let (base_url, _server) = start_server(
        dir.path(),
        &[
            ("AZURE_SUBSCRIPTION_ID", "sub-it"),
            ("AZURE_ACCESS_TOKEN", "static-token"),
            ("AZURE_RESOURCE_MANAGER_ENDPOINT", arm.base_url()),
            ("OPENAI_API_KEY", "sk-it"),
            ("OPENAI_BASE_URL", &openai_base),
        ],
    )
    .await?;

    let session = McpSession::connect(&base_url).await?;

    let groups = session.call_tool("get_azure_resource_groups", json!({})).await?;
    let names: Value = serde_json::from_str(&result_text(&groups)?)?;
    assert_eq!(names, json!(["rg-a", "rg-b"]));

    let inv = session
        .call_tool("list_resources_in_group", json!({ "resource_group": "rg-a" }))
        .await?;
    let inv = result_structured(&inv)?;
    assert_eq!(inv["resource_count"], json!(2));
    assert_eq!(inv["resources"].as_array().map(Vec::len), Some(2));

    let advice = session
        .call_tool(
            "get_ai_troubleshooting_advice",
            json!({ "error_details": "NSG blocks port 443" }),
        )
        .await?;
    assert_eq!(result_text(&advice)?, "model: Explain: NSG blocks port 443");

    // No resource-analysis template in the work dir: standard summary.
    let analysis = session
        .call_tool(
            "analyze_resources_with_ai",
            json!({ "resource_group": "rg-a", "include_network": true }),
        )
        .await?;
    let analysis = result_structured(&analysis)?;
    assert_eq!(analysis["ai_powered"], json!(false));
    assert_eq!(
        analysis["resource_data"]["network_resources"][0]["name"],
        json!("vnet")
    );
    Ok(())
}

#[test]
fn check_config_reports_missing_values() -> anyhow::Result<()> {
    let dir = tempdir().context("create temp dir")?;

    let out = server_command(dir.path(), &[("OPENAI_API_KEY", "sk-x")])
        .arg("check-config")
        .output()
        .context("run check-config")?;
    assert!(!out.status.success());
    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.contains("AZURE_SUBSCRIPTION_ID"), "{stdout}");
    assert!(!stdout.contains("OPENAI_API_KEY"), "{stdout}");

    let out = server_command(
        dir.path(),
        &[("OPENAI_API_KEY", "sk-x"), ("AZURE_SUBSCRIPTION_ID", "sub")],
    )
    .arg("check-config")
    .output()
    .context("run check-config")?;
    assert!(out.status.success());
    Ok(())
}
