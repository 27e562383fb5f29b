//! Thin REST client over the Azure Resource Manager endpoints used by the tools.
//!
//! Every call is a single authenticated `GET`; list operations follow `nextLink` until the
//! last page. There are no retries.

use crate::credential::TokenCredential;
use crate::error::{AzureError, Result};
use crate::models::{Deployment, GenericResource, Page, ResourceGroup};
use hero_http_tools::response::api_failure;
use hero_http_tools::safety::redact_url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";
pub const ARM_API_VERSION: &str = "2021-04-01";

#[derive(Clone)]
pub struct ArmClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    subscription_id: String,
    credential: Arc<dyn TokenCredential>,
}

impl ArmClient {
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid base URL.
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self> {
        let base_url = Url::parse(endpoint).map_err(|e| {
            AzureError::Config(format!("Invalid resource manager endpoint '{endpoint}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AzureError::Config(format!(
                "Resource manager endpoint '{endpoint}' cannot be a base URL"
            )));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                subscription_id: subscription_id.into(),
                credential,
            }),
        })
    }

    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    /// `GET /subscriptions/{sub}/resourcegroups`
    ///
    /// # Errors
    ///
    /// Returns an error on credential, transport, or ARM failures.
    pub async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>> {
        let url = self.url(&["resourcegroups"])?;
        self.list_all(url).await
    }

    /// `GET /subscriptions/{sub}/resourcegroups/{rg}/providers/Microsoft.Resources/deployments/{name}`
    ///
    /// # Errors
    ///
    /// Returns an error on credential, transport, or ARM failures (including 404 for an unknown
    /// deployment or resource group).
    pub async fn get_deployment(
        &self,
        resource_group: &str,
        deployment_name: &str,
    ) -> Result<Deployment> {
        let url = self.url(&[
            "resourcegroups",
            resource_group,
            "providers",
            "Microsoft.Resources",
            "deployments",
            deployment_name,
        ])?;
        self.get_json(url).await
    }

    /// `GET /subscriptions/{sub}/resourceGroups/{rg}/resources`
    ///
    /// # Errors
    ///
    /// Returns an error on credential, transport, or ARM failures.
    pub async fn list_resources_by_group(
        &self,
        resource_group: &str,
    ) -> Result<Vec<GenericResource>> {
        let url = self.url(&["resourceGroups", resource_group, "resources"])?;
        self.list_all(url).await
    }

    /// Subscription-scoped URL with `api-version` set. Segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AzureError::Config("resource manager endpoint cannot be a base".into()))?
            .pop_if_empty()
            .extend(["subscriptions", self.inner.subscription_id.as_str()])
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", ARM_API_VERSION);
        Ok(url)
    }

    async fn list_all<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            let page: Page<T> = self.get_json(url).await?;
            items.extend(page.value);
            next = match page.next_link.filter(|s| !s.is_empty()) {
                Some(link) => Some(self.checked_next_link(&link)?),
                None => None,
            };
        }
        Ok(items)
    }

    /// The bearer token is only ever sent to the configured endpoint's origin.
    fn checked_next_link(&self, link: &str) -> Result<Url> {
        let url = Url::parse(link)
            .map_err(|e| AzureError::Decode(format!("invalid nextLink: {e}")))?;
        if url.origin() != self.inner.base_url.origin() {
            return Err(AzureError::Decode(format!(
                "nextLink points outside the resource manager endpoint: {}",
                redact_url(&url)
            )));
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let token = self.inner.credential.bearer_token().await?;

        tracing::debug!(url = %redact_url(&url), "ARM GET");
        let resp = self
            .inner
            .http
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AzureError::Api(api_failure(resp).await));
        }

        Ok(resp.json::<T>().await?)
    }
}
