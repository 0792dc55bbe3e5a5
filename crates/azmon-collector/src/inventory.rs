//! Resource inventory discovery and session-host status
//!
//! File shares, scale sets and managed clusters discover their children
//! instead of metric dimensions. Rows go through the same discovery document
//! as dimensional discovery, with fixed macro names per inventory.

use crate::azure::{InventoryClient, NamedResource, ScaleSetVm, SessionHost, resource_name};
use crate::error::CollectorError;
use azmon_common::{Assignment, Component};
use clap::ValueEnum;
use std::fmt;
use tracing::debug;

/// Which level of a scale set or cluster to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventoryKind {
    Cluster,
    Instance,
    Node,
}

impl fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryKind::Cluster => f.write_str("cluster"),
            InventoryKind::Instance => f.write_str("instance"),
            InventoryKind::Node => f.write_str("node"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inventory {
    /// File services of a storage account
    FileSystems,
    /// The scale set itself
    ScaleSet,
    ScaleSetInstances,
    /// The managed cluster itself
    Cluster,
    /// Guest host names of every node pool instance
    ClusterNodes,
}

impl Inventory {
    pub fn select(component: Component, kind: Option<InventoryKind>) -> Result<Self, CollectorError> {
        match (component, kind) {
            (Component::FileShare, None) => Ok(Inventory::FileSystems),
            (Component::Vmss, Some(InventoryKind::Cluster)) => Ok(Inventory::ScaleSet),
            (Component::Vmss, Some(InventoryKind::Instance)) => Ok(Inventory::ScaleSetInstances),
            (Component::Aks, Some(InventoryKind::Cluster)) => Ok(Inventory::Cluster),
            (Component::Aks, Some(InventoryKind::Node)) => Ok(Inventory::ClusterNodes),
            _ => Err(CollectorError::UnsupportedInventory {
                component,
                kind: kind.map_or_else(|| "default".to_string(), |k| k.to_string()),
            }),
        }
    }

    /// Discovery rows for the resource `resource_id`
    pub async fn collect(
        self,
        client: &InventoryClient,
        resource_id: &str,
    ) -> Result<Vec<Assignment>, CollectorError> {
        let name = resource_name(resource_id);
        let rows = match self {
            Inventory::FileSystems => file_system_rows(&client.file_services(resource_id).await?),
            Inventory::ScaleSet => vec![Assignment::from_pairs([
                ("VmssName", name),
                ("ResourceId", resource_id),
            ])],
            Inventory::ScaleSetInstances => {
                let instances = client.scale_set_instances(resource_id).await?;
                instance_rows(name, resource_id, &instances)
            }
            Inventory::Cluster => vec![Assignment::from_pairs([
                ("ClusterName", name),
                ("ResourceId", resource_id),
            ])],
            Inventory::ClusterNodes => {
                let group = client.node_resource_group(resource_id).await?;
                debug!(node_resource_group = %group, "Listing node pools");
                let mut nodes = Vec::new();
                for pool in client.scale_sets_in_group(&group).await? {
                    nodes.extend(client.scale_set_instances(&pool.id).await?);
                }
                node_rows(name, resource_id, &nodes)
            }
        };
        Ok(rows)
    }
}

pub fn file_system_rows(services: &[NamedResource]) -> Vec<Assignment> {
    services
        .iter()
        .map(|s| Assignment::from_pairs([("file-system", s.name.as_str())]))
        .collect()
}

pub fn instance_rows(scale_set: &str, resource_id: &str, instances: &[ScaleSetVm]) -> Vec<Assignment> {
    instances
        .iter()
        .map(|vm| {
            Assignment::from_pairs([
                ("VmssName", scale_set),
                ("InstanceName", vm.name.as_str()),
                ("ResourceId", resource_id),
            ])
        })
        .collect()
}

/// One row per node, each carrying the cluster's own resource id
pub fn node_rows(cluster: &str, resource_id: &str, nodes: &[ScaleSetVm]) -> Vec<Assignment> {
    nodes
        .iter()
        .map(|vm| {
            Assignment::from_pairs([
                ("ClusterName", cluster),
                ("NodeName", vm.computer_name()),
                ("ResourceId", resource_id),
            ])
        })
        .collect()
}

/// Host name inside a monitoring host alias: `wvd.vm-7.corp` → `vm-7`
pub fn host_alias(zbx_hostname: &str) -> Option<&str> {
    zbx_hostname
        .split('.')
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Host name of a session host: `pool/vm-7.corp.local` → `vm-7`
pub fn session_name(name: &str) -> &str {
    let host = name.split_once('/').map_or(name, |(_, host)| host);
    host.split('.').next().unwrap_or(host).trim()
}

/// 1 when the session host named `alias` is available, else 0
pub fn session_host_status(hosts: &[SessionHost], alias: &str) -> Result<i64, CollectorError> {
    let host = hosts
        .iter()
        .find(|h| session_name(&h.name).eq_ignore_ascii_case(alias))
        .ok_or_else(|| CollectorError::SessionHostNotFound {
            host: alias.to_string(),
        })?;
    debug!(host = %host.name, status = ?host.status(), "Session host");
    Ok(i64::from(host.status() == Some("Available")))
}
