//! Azure Resource Manager inspection for the Hero of the Day MCP server.
//!
//! - [`credential`]: bearer tokens for ARM (client secret or a pre-acquired token)
//! - [`arm`]: thin REST client over the ARM endpoints we need
//! - [`manager`]: the inspection operations exposed as tools
//! - [`models`]: wire types and the records returned to callers

pub mod arm;
pub mod credential;
pub mod error;
pub mod manager;
pub mod models;

pub use arm::ArmClient;
pub use error::{AzureError, Result};
pub use manager::AzureManager;
