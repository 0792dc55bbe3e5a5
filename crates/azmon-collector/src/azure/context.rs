//! Authenticated Azure Resource Manager context
//!
//! Provides `AzureContext`, holding one HTTP client and one bearer token, from
//! which the monitor, resolver and inventory clients are created, and the
//! paged list envelope every Resource Manager collection is returned in.

use super::auth::AccessToken;
use super::error::classify_response;
use anyhow::{Context, Result};
use azmon_common::defaults::ARM_ENDPOINT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Build the HTTP client shared by every request of one invocation
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// One page of a Resource Manager collection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Absolute URL of the next page, carrying its own query string
    pub next_link: Option<String>,
}

/// Shared Resource Manager context for creating service clients.
///
/// # Example
/// ```ignore
/// let azure = CredentialProvider::new(&config).authenticate("contoso").await?;
///
/// let monitor = MonitorClient::from_context(&azure);
/// let resolver = ResourceResolver::from_context(&azure);
/// ```
#[derive(Clone)]
pub struct AzureContext {
    http: reqwest::Client,
    token: AccessToken,
    subscription_id: String,
    endpoint: String,
}

impl AzureContext {
    pub fn new(http: reqwest::Client, token: AccessToken, subscription_id: &str) -> Self {
        Self {
            http,
            token,
            subscription_id: subscription_id.to_string(),
            endpoint: ARM_ENDPOINT.to_string(),
        }
    }

    /// Point Resource Manager calls at another endpoint (sovereign clouds, tests)
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Absolute URL for a Resource Manager path starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// GET `url` with bearer auth and decode a JSON body.
    ///
    /// Non-success statuses are classified into [`AzureError`](super::AzureError).
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url, params = query.len(), "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.secret())
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            return Err(classify_response(status.as_u16(), &body))
                .with_context(|| format!("GET {url}"));
        }

        serde_json::from_str(&body).with_context(|| format!("Unexpected response from {url}"))
    }

    /// GET every page of a collection, following `nextLink`
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut page: Page<T> = self.get_json(url, query).await?;
        let mut items = Vec::new();
        loop {
            items.append(&mut page.value);
            match page.next_link.take() {
                Some(next) => page = self.get_json(&next, &[]).await?,
                None => return Ok(items),
            }
        }
    }
}

impl std::fmt::Debug for AzureContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureContext")
            .field("subscription_id", &self.subscription_id)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
