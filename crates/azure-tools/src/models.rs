//! ARM wire types and the records handed back to tool callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for fields ARM did not report.
pub const UNKNOWN: &str = "Unknown";

const NETWORK_PROVIDER_PREFIX: &str = "microsoft.network/";

/// One page of an ARM list operation.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default, rename = "nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceGroup {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: DeploymentProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// ARM `ErrorResponse` (code, message, nested details). Kept verbatim.
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenericResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub sku: Option<Sku>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sku {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
}

/// A resource as reported to tool callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub location: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl ResourceSummary {
    #[must_use]
    pub fn is_network(&self) -> bool {
        self.resource_type
            .to_ascii_lowercase()
            .starts_with(NETWORK_PROVIDER_PREFIX)
    }
}

impl From<GenericResource> for ResourceSummary {
    fn from(r: GenericResource) -> Self {
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            name: or_unknown(r.name),
            resource_type: or_unknown(r.resource_type),
            location: or_unknown(r.location),
            id: or_unknown(r.id),
            kind: r.kind.filter(|k| !k.is_empty()),
            sku: r.sku.and_then(|s| s.name.or(s.tier)),
        }
    }
}

/// Resources of one resource group.
///
/// `resource_count` is derived from `resources` at construction and cannot drift from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceInventory {
    resource_group: String,
    resource_count: usize,
    resources: Vec<ResourceSummary>,
}

impl ResourceInventory {
    #[must_use]
    pub fn new(resource_group: impl Into<String>, resources: Vec<ResourceSummary>) -> Self {
        Self {
            resource_group: resource_group.into(),
            resource_count: resources.len(),
            resources,
        }
    }

    #[must_use]
    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resource_count
    }

    #[must_use]
    pub fn resources(&self) -> &[ResourceSummary] {
        &self.resources
    }

    #[must_use]
    pub fn network_resources(&self) -> Vec<ResourceSummary> {
        self.resources
            .iter()
            .filter(|r| r.is_network())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentDiagnosis {
    pub deployment_name: String,
    pub resource_group: String,
    pub deployment_state: String,
    /// `null` when the deployment reported no error.
    pub error: Option<Value>,
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

pub const NETWORK_STATUS_ANALYSIS_NEEDED: &str = "analysis_needed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkReport {
    pub resource_group: String,
    pub status: String,
    pub message: String,
    pub network_resource_count: usize,
    pub network_resources: Vec<ResourceSummary>,
}

impl NetworkReport {
    #[must_use]
    pub fn from_inventory(inventory: &ResourceInventory) -> Self {
        let network_resources = inventory.network_resources();
        let message = if network_resources.is_empty() {
            "No network resources found in this resource group; automated network analysis is \
             not implemented"
                .to_string()
        } else {
            "Automated network analysis is not implemented; review the listed network security \
             groups, route tables, virtual networks, load balancers and application gateways"
                .to_string()
        };
        Self {
            resource_group: inventory.resource_group().to_string(),
            status: NETWORK_STATUS_ANALYSIS_NEEDED.to_string(),
            message,
            network_resource_count: network_resources.len(),
            network_resources,
        }
    }
}
