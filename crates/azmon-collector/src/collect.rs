//! Collector entry points
//!
//! Each function runs one collection against a [`MetricClient`] and returns
//! the [`Report`] to print. Errors are left to [`Report::from_outcome`].

use crate::azure::{
    AzureContext, FromAzureContext, InventoryClient, ResourceResolver, with_sub_resource,
};
use crate::config::{CollectorConfig, DiscoverConfig, SampleConfig, Target};
use crate::discovery::DiscoveryEngine;
use crate::error::CollectorError;
use crate::inventory::{Inventory, host_alias, session_host_status};
use crate::report::Report;
use crate::sampler::MetricSampler;
use azmon_common::dimension::parse_dimension_list;
use azmon_common::{Component, MetricClient};
use chrono::{DateTime, Utc};
use tracing::info;

/// Resource id the target refers to, resolving its tag unless an id was given
pub async fn resolve_target(
    ctx: &AzureContext,
    config: &CollectorConfig,
    target: &Target,
) -> Result<String, CollectorError> {
    let base = match &target.resource_id {
        Some(id) => id.clone(),
        None => {
            ResourceResolver::from_context(ctx)
                .resolve(
                    &config.tag_key,
                    &target.sys_id,
                    target.component.resource_types(),
                )
                .await?
        }
    };
    Ok(with_sub_resource(&base, target.sub_resource.as_deref()))
}

pub async fn sample<C: MetricClient>(
    client: &C,
    resource_id: &str,
    component: Component,
    config: &SampleConfig,
    now: DateTime<Utc>,
) -> Result<Report, CollectorError> {
    let query = config.query(component, now);
    info!(component = %component, metric = %query.metric, "Collecting sample");
    let value = MetricSampler::new(client, resource_id).sample(&query).await?;
    Ok(Report::Value(value))
}

pub async fn discover<C: MetricClient>(
    client: &C,
    resource_id: &str,
    config: &DiscoverConfig,
) -> Result<Report, CollectorError> {
    let dimensions = parse_dimension_list(&config.dimensions);
    let discovery = DiscoveryEngine::new(client, resource_id)
        .discover(config.metric.as_deref(), &dimensions)
        .await?;
    info!(
        metric = %discovery.metric,
        entries = discovery.assignments.len(),
        probes = discovery.probes,
        "Discovery complete"
    );
    discovery.to_report()
}

pub async fn inventory(
    client: &InventoryClient,
    resource_id: &str,
    inventory: Inventory,
) -> Result<Report, CollectorError> {
    let rows = inventory.collect(client, resource_id).await?;
    info!(inventory = ?inventory, entries = rows.len(), "Inventory complete");
    Report::document(&rows)
}

/// Availability (1 or 0) of the session host a monitoring host alias names
pub async fn session_host(
    client: &InventoryClient,
    host_pool_id: &str,
    zbx_hostname: &str,
) -> Result<Report, CollectorError> {
    let alias = host_alias(zbx_hostname).ok_or_else(|| CollectorError::SessionHostNotFound {
        host: zbx_hostname.to_string(),
    })?;
    let hosts = client.session_hosts(host_pool_id).await?;
    Ok(Report::Value(session_host_status(&hosts, alias)?))
}
