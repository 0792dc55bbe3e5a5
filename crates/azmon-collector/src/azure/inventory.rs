//! Resource inventory listings
//!
//! Some collectors discover the children of a resource rather than metric
//! dimensions: a storage account's file services, a scale set's instances,
//! the nodes behind a managed cluster, or a host pool's session hosts.

use super::FromAzureContext;
use super::context::AzureContext;
use anyhow::{Context, Result};
use azmon_common::defaults::{
    COMPUTE_API_VERSION, CONTAINER_SERVICE_API_VERSION, DESKTOP_VIRTUALIZATION_API_VERSION,
    STORAGE_API_VERSION,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Last segment of a resource id (`.../virtualMachineScaleSets/web` → `web`)
pub fn resource_name(resource_id: &str) -> &str {
    resource_id
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(resource_id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScaleSetVm {
    pub name: String,
    #[serde(default)]
    properties: VmProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmProperties {
    os_profile: Option<OsProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OsProfile {
    computer_name: Option<String>,
}

impl ScaleSetVm {
    /// Guest host name, falling back to the instance name
    pub fn computer_name(&self) -> &str {
        self.properties
            .os_profile
            .as_ref()
            .and_then(|p| p.computer_name.as_deref())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct ManagedCluster {
    properties: ClusterProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterProperties {
    node_resource_group: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionHost {
    /// `<host pool>/<host name>`
    pub name: String,
    #[serde(default)]
    properties: SessionHostProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SessionHostProperties {
    status: Option<String>,
}

impl SessionHost {
    pub fn status(&self) -> Option<&str> {
        self.properties.status.as_deref()
    }
}

/// Lists child resources within one subscription
#[derive(Debug, Clone)]
pub struct InventoryClient {
    context: AzureContext,
}

impl FromAzureContext for InventoryClient {
    fn from_context(ctx: &AzureContext) -> Self {
        Self {
            context: ctx.clone(),
        }
    }
}

impl InventoryClient {
    async fn list<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<Vec<T>> {
        let url = self.context.url(path);
        let items: Vec<T> = self
            .context
            .get_all(&url, &[("api-version", api_version.to_string())])
            .await?;
        debug!(path, count = items.len(), "Listed children");
        Ok(items)
    }

    /// File services of a storage account
    pub async fn file_services(&self, account_id: &str) -> Result<Vec<NamedResource>> {
        self.list(&format!("{account_id}/fileServices"), STORAGE_API_VERSION)
            .await
    }

    pub async fn scale_set_instances(&self, scale_set_id: &str) -> Result<Vec<ScaleSetVm>> {
        self.list(&format!("{scale_set_id}/virtualMachines"), COMPUTE_API_VERSION)
            .await
    }

    /// Scale sets of one resource group in the context's subscription
    pub async fn scale_sets_in_group(&self, resource_group: &str) -> Result<Vec<NamedResource>> {
        let path = format!(
            "/subscriptions/{}/resourceGroups/{resource_group}/providers/Microsoft.Compute/virtualMachineScaleSets",
            self.context.subscription_id()
        );
        self.list(&path, COMPUTE_API_VERSION).await
    }

    /// Resource group holding a managed cluster's node pools
    pub async fn node_resource_group(&self, cluster_id: &str) -> Result<String> {
        let url = self.context.url(cluster_id);
        let cluster: ManagedCluster = self
            .context
            .get_json(
                &url,
                &[("api-version", CONTAINER_SERVICE_API_VERSION.to_string())],
            )
            .await
            .with_context(|| format!("Failed to read cluster {cluster_id}"))?;
        Ok(cluster.properties.node_resource_group)
    }

    pub async fn session_hosts(&self, host_pool_id: &str) -> Result<Vec<SessionHost>> {
        self.list(
            &format!("{host_pool_id}/sessionHosts"),
            DESKTOP_VIRTUALIZATION_API_VERSION,
        )
        .await
    }
}
