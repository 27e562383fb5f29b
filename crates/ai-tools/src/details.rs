//! The error-details record fed to deployment analysis.

use hero_azure_tools::models::{DeploymentDiagnosis, UNKNOWN};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything known about a failure. All fields are optional; absent ones render as `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Free-form description, or the ARM error message.
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ErrorDetails {
    /// Details consisting only of a caller-supplied description.
    #[must_use]
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            message: Some(description.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state_or_unknown(&self) -> &str {
        self.deployment_state.as_deref().unwrap_or(UNKNOWN)
    }

    #[must_use]
    pub fn timestamp_or_unknown(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(UNKNOWN)
    }

    /// Variables for the error-analysis template.
    #[must_use]
    pub fn template_context(&self) -> tera::Context {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());

        let mut ctx = tera::Context::new();
        ctx.insert(
            "error_details",
            &serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string()),
        );
        ctx.insert("deployment_name", &or_unknown(&self.deployment_name));
        ctx.insert("resource_group", &or_unknown(&self.resource_group));
        ctx.insert("deployment_state", &or_unknown(&self.deployment_state));
        ctx.insert("timestamp", &or_unknown(&self.timestamp));
        ctx.insert("message", &or_unknown(&self.message));
        ctx
    }
}

impl From<&DeploymentDiagnosis> for ErrorDetails {
    fn from(d: &DeploymentDiagnosis) -> Self {
        let message = d
            .error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            deployment_name: Some(d.deployment_name.clone()),
            resource_group: Some(d.resource_group.clone()),
            deployment_state: Some(d.deployment_state.clone()),
            timestamp: d.timestamp.clone(),
            message,
            error: d.error.clone(),
        }
    }
}
