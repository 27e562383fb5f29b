//! Outbound `reqwest::Client` construction.

use crate::{HttpToolsError, Result};
use std::time::Duration;

/// Options for the single outbound client shared by the Azure and completion backends.
#[derive(Debug, Clone, Default)]
pub struct OutboundClientOptions {
    /// Accept invalid TLS certificates (intercepting proxies during local testing).
    ///
    /// Scoped to the client built from these options; nothing else in the process is affected.
    pub insecure_skip_tls_verify: bool,
    /// Whole-request timeout. `None` (or zero) waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl OutboundClientOptions {
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn build(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();

        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(t) = self.timeout.filter(|t| !t.is_zero()) {
            builder = builder.timeout(t);
        }
        if self.insecure_skip_tls_verify {
            tracing::warn!(
                "TLS certificate verification is DISABLED for outbound Azure/OpenAI requests; \
                 only use this behind a trusted intercepting proxy"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| HttpToolsError::Config(format!("build outbound HTTP client: {e}")))
    }
}
