//! Deterministic text used whenever the completion backend cannot be used.
//!
//! Output depends only on the input's own fields.

use crate::details::ErrorDetails;
use hero_azure_tools::models::{ResourceInventory, ResourceSummary};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const NEXT_STEPS: [&str; 5] = [
    "Review network security group configuration",
    "Check Azure resource quotas and limits",
    "Validate ARM template syntax",
    "Test connectivity from deployment source",
    "Review diagnostic logs in Azure Monitor",
];

#[must_use]
pub fn suggest_next_steps() -> Vec<String> {
    NEXT_STEPS.iter().map(|s| (*s).to_string()).collect()
}

/// Root cause / troubleshooting steps / prevention / summary for a failed deployment.
#[must_use]
pub fn deployment_analysis(details: &ErrorDetails) -> String {
    let mut out = String::from(
        "## Root Cause Analysis\n\
         Based on the deployment error details, this appears to be a network configuration issue.\n\
         \n\
         ## Troubleshooting Steps\n\
         1. Check network security group rules\n\
         2. Verify subnet configuration\n\
         3. Validate DNS settings\n\
         4. Review firewall policies\n\
         \n\
         ## Prevention Recommendations\n\
         - Implement infrastructure as code\n\
         - Use Azure Policy for compliance\n\
         - Set up monitoring and alerting\n\
         \n\
         ## Error Summary\n",
    );

    let _ = writeln!(out, "State: {}", details.state_or_unknown());
    let _ = writeln!(out, "Timestamp: {}", details.timestamp_or_unknown());
    if let Some(name) = &details.deployment_name {
        match &details.resource_group {
            Some(rg) => {
                let _ = writeln!(out, "Deployment: {name} (resource group {rg})");
            }
            None => {
                let _ = writeln!(out, "Deployment: {name}");
            }
        }
    }
    if let Some(message) = &details.message {
        let _ = writeln!(out, "Details: {message}");
    }
    out
}

/// Counts by type and location, optional network listing, and the standard next steps.
#[must_use]
pub fn resource_summary(
    inventory: &ResourceInventory,
    network: Option<&[ResourceSummary]>,
) -> String {
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_location: BTreeMap<&str, usize> = BTreeMap::new();
    for r in inventory.resources() {
        *by_type.entry(r.resource_type.as_str()).or_default() += 1;
        *by_location.entry(r.location.as_str()).or_default() += 1;
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "## Resource Summary for {}",
        inventory.resource_group()
    );
    let _ = writeln!(out, "Total resources: {}", inventory.resource_count());

    if !by_type.is_empty() {
        out.push_str("\n### Resources by type\n");
        for (ty, n) in &by_type {
            let _ = writeln!(out, "- {ty}: {n}");
        }
        out.push_str("\n### Locations\n");
        for (loc, n) in &by_location {
            let _ = writeln!(out, "- {loc}: {n}");
        }
    }

    if let Some(network) = network {
        out.push_str("\n### Network resources\n");
        if network.is_empty() {
            out.push_str("- none found\n");
        }
        for r in network {
            let _ = writeln!(out, "- {} ({}, {})", r.name, r.resource_type, r.location);
        }
    }

    out.push_str("\n## Recommended Next Steps\n");
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        let _ = writeln!(out, "{}. {step}", i + 1);
    }
    out
}
