//! Bearer tokens for Azure Resource Manager.

use crate::error::{AzureError, Result};
use async_trait::async_trait;
use hero_http_tools::response::api_failure;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tokens are refreshed this long before the issuer-reported expiry.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Source of `Authorization: Bearer` tokens for ARM requests.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

/// Raw credential settings, each possibly unset.
#[derive(Debug, Clone, Default)]
pub struct CredentialSettings {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Pre-acquired ARM token (e.g. `az account get-access-token`). Wins over the client secret.
    pub access_token: Option<String>,
    /// Entra ID authority, defaults to [`DEFAULT_AUTHORITY_HOST`].
    pub authority_host: Option<String>,
}

/// Pick a credential for the given settings.
///
/// Incomplete client-secret settings do not fail here: the returned credential reports which
/// variables are missing on first use, so the server still starts and answers tool calls.
///
/// # Errors
///
/// Returns an error if the authority host is not a valid URL.
pub fn credential_from_settings(
    http: reqwest::Client,
    settings: &CredentialSettings,
    resource_manager_endpoint: &str,
) -> Result<Arc<dyn TokenCredential>> {
    if let Some(token) = non_empty(settings.access_token.as_deref()) {
        return Ok(Arc::new(StaticTokenCredential::new(token)));
    }

    let tenant_id = non_empty(settings.tenant_id.as_deref());
    let client_id = non_empty(settings.client_id.as_deref());
    let client_secret = non_empty(settings.client_secret.as_deref());

    match (tenant_id, client_id, client_secret) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => {
            let authority = non_empty(settings.authority_host.as_deref())
                .unwrap_or(DEFAULT_AUTHORITY_HOST);
            let cred = ClientSecretCredential::new(
                http,
                authority,
                tenant_id,
                client_id,
                client_secret,
                &arm_scope(resource_manager_endpoint),
            )?;
            Ok(Arc::new(cred))
        }
        (tenant_id, client_id, client_secret) => {
            let mut missing = Vec::new();
            if tenant_id.is_none() {
                missing.push("AZURE_TENANT_ID");
            }
            if client_id.is_none() {
                missing.push("AZURE_CLIENT_ID");
            }
            if client_secret.is_none() {
                missing.push("AZURE_CLIENT_SECRET");
            }
            Ok(Arc::new(MissingCredential { missing }))
        }
    }
}

/// `https://management.azure.com` -> `https://management.azure.com/.default`
#[must_use]
pub fn arm_scope(resource_manager_endpoint: &str) -> String {
    format!("{}/.default", resource_manager_endpoint.trim_end_matches('/'))
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// A token acquired out of band. Never refreshed.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

struct MissingCredential {
    missing: Vec<&'static str>,
}

#[async_trait]
impl TokenCredential for MissingCredential {
    async fn bearer_token(&self) -> Result<String> {
        Err(AzureError::Credential(format!(
            "Azure credentials not configured (missing {}; or set AZURE_ACCESS_TOKEN)",
            self.missing.join(", ")
        )))
    }
}

/// OAuth2 client-credentials flow against Entra ID (service principal + secret).
#[derive(Clone)]
pub struct ClientSecretCredential {
    inner: Arc<Inner>,
}

struct Inner {
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    http: reqwest::Client,
    cache: RwLock<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl ClientSecretCredential {
    /// # Errors
    ///
    /// Returns an error if `authority_host` is not a valid base URL.
    pub fn new(
        http: reqwest::Client,
        authority_host: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> Result<Self> {
        let mut token_url = Url::parse(authority_host).map_err(|e| {
            AzureError::Config(format!("Invalid authority host '{authority_host}': {e}"))
        })?;
        token_url
            .path_segments_mut()
            .map_err(|()| {
                AzureError::Config(format!("Authority host '{authority_host}' cannot be a base"))
            })?
            .pop_if_empty()
            .extend([tenant_id, "oauth2", "v2.0", "token"]);

        Ok(Self {
            inner: Arc::new(Inner {
                token_url,
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
                scope: scope.to_string(),
                http,
                cache: RwLock::new(None),
            }),
        })
    }

    async fn fetch(&self) -> Result<CachedToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.as_str()),
            ("scope", self.inner.scope.as_str()),
        ];

        tracing::debug!(client_id = %self.inner.client_id, "requesting ARM access token");
        let resp = self
            .inner
            .http
            .post(self.inner.token_url.clone())
            .form(&form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let failure = api_failure(resp).await;
            return Err(AzureError::Credential(format!(
                "token request failed: {failure}"
            )));
        }

        let body: TokenResponse = resp.json().await?;
        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));
        Ok(CachedToken {
            access_token: body.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_SKEW),
        })
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn bearer_token(&self) -> Result<String> {
        if let Some(cached) = self.inner.cache.read().await.as_ref()
            && Instant::now() < cached.refresh_at
        {
            return Ok(cached.access_token.clone());
        }

        let mut cache = self.inner.cache.write().await;
        // Another caller may have refreshed while we waited for the write lock.
        if let Some(cached) = cache.as_ref()
            && Instant::now() < cached.refresh_at
        {
            return Ok(cached.access_token.clone());
        }

        let fresh = self.fetch().await?;
        let token = fresh.access_token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}
