//! Hero of the Day MCP server.
//!
//! Tools for inspecting an Azure subscription and generating troubleshooting text, served over
//! MCP streamable HTTP:
//! - [`tools`]: the operations themselves ([`tools::Toolbox`])
//! - [`server`]: rmcp tool routing and schemas
//! - [`http`]: axum app with `/mcp` and `/health`
//! - [`config`] / [`telemetry`]: startup plumbing

pub mod config;
pub mod http;
pub mod outcome;
pub mod server;
pub mod telemetry;
pub mod tools;
