//! Inspection operations backing the Azure tools.

use crate::arm::ArmClient;
use crate::error::Result;
use crate::models::{
    DeploymentDiagnosis, NetworkReport, ResourceInventory, ResourceSummary, UNKNOWN,
};

#[derive(Clone)]
pub struct AzureManager {
    arm: ArmClient,
}

impl AzureManager {
    #[must_use]
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.arm.subscription_id()
    }

    /// Names of all resource groups in the subscription, in ARM order.
    ///
    /// # Errors
    ///
    /// Propagates ARM/credential failures; an empty subscription is `Ok(vec![])`.
    pub async fn list_resource_groups(&self) -> Result<Vec<String>> {
        let groups = self.arm.list_resource_groups().await?;
        tracing::debug!(
            subscription_id = %self.subscription_id(),
            count = groups.len(),
            "listed resource groups"
        );
        Ok(groups.into_iter().map(|g| g.name).collect())
    }

    /// Fetch a deployment and report its state, error, and timestamp.
    ///
    /// # Errors
    ///
    /// Propagates ARM/credential failures, including "deployment not found".
    pub async fn diagnose_deployment_error(
        &self,
        deployment_name: &str,
        resource_group: &str,
    ) -> Result<DeploymentDiagnosis> {
        let deployment = self
            .arm
            .get_deployment(resource_group, deployment_name)
            .await?;
        let props = deployment.properties;

        Ok(DeploymentDiagnosis {
            deployment_name: deployment_name.to_string(),
            resource_group: resource_group.to_string(),
            deployment_state: props
                .provisioning_state
                .unwrap_or_else(|| UNKNOWN.to_string()),
            error: props.error.filter(|e| !e.is_null()),
            timestamp: props.timestamp,
            ai_analysis: None,
        })
    }

    /// # Errors
    ///
    /// Propagates ARM/credential failures, including "resource group not found".
    pub async fn list_resources_in_group(&self, resource_group: &str) -> Result<ResourceInventory> {
        let resources: Vec<ResourceSummary> = self
            .arm
            .list_resources_by_group(resource_group)
            .await?
            .into_iter()
            .map(ResourceSummary::from)
            .collect();
        Ok(ResourceInventory::new(resource_group, resources))
    }

    /// Inventory of the group's network resources.
    ///
    /// No analysis is performed on them; the report says so.
    ///
    /// # Errors
    ///
    /// Propagates ARM/credential failures.
    pub async fn get_network_issues(&self, resource_group: &str) -> Result<NetworkReport> {
        tracing::info!(resource_group = %resource_group, "analyzing network resources");
        let inventory = self.list_resources_in_group(resource_group).await?;
        Ok(NetworkReport::from_inventory(&inventory))
    }
}
