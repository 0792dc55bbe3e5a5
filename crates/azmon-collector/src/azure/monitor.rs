//! Azure Monitor REST client
//!
//! Implements [`MetricClient`] over `microsoft.insights/metrics` and
//! `microsoft.insights/metricDefinitions`. Response decoding is kept in plain
//! functions so it can be tested against recorded payloads.

use super::FromAzureContext;
use super::context::AzureContext;
use anyhow::Result;
use azmon_common::defaults::METRICS_API_VERSION;
use azmon_common::{
    DataPoint, DimensionName, DimensionValue, MetricClient, MetricDefinition, MetricFilter,
    TimeSeries, TimeSeriesQuery,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct LocalizableString {
    value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricsResponse {
    #[serde(default)]
    value: Vec<MetricEntry>,
}

#[derive(Debug, Deserialize)]
struct MetricEntry {
    #[serde(default)]
    timeseries: Vec<TimeSeriesEntry>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesEntry {
    #[serde(default)]
    metadatavalues: Vec<MetadataValue>,
    #[serde(default)]
    data: Vec<PointEntry>,
}

#[derive(Debug, Deserialize)]
struct MetadataValue {
    name: LocalizableString,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointEntry {
    time_stamp: Option<DateTime<Utc>>,
    average: Option<f64>,
    maximum: Option<f64>,
    minimum: Option<f64>,
    total: Option<f64>,
    count: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DefinitionsResponse {
    #[serde(default)]
    value: Vec<DefinitionEntry>,
}

#[derive(Debug, Deserialize)]
struct DefinitionEntry {
    name: LocalizableString,
    #[serde(default)]
    dimensions: Vec<LocalizableString>,
}

/// Series of the first (only) requested metric
pub(crate) fn parse_time_series(response: MetricsResponse) -> Vec<TimeSeries> {
    response
        .value
        .into_iter()
        .next()
        .map(|metric| {
            metric
                .timeseries
                .into_iter()
                .map(|ts| TimeSeries {
                    metadata: ts
                        .metadatavalues
                        .into_iter()
                        .map(|m| (DimensionName::new(m.name.value), DimensionValue::new(m.value)))
                        .collect(),
                    points: ts
                        .data
                        .into_iter()
                        .map(|p| DataPoint {
                            timestamp: p.time_stamp,
                            average: p.average,
                            maximum: p.maximum,
                            minimum: p.minimum,
                            total: p.total,
                            count: p.count,
                        })
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Distinct values of `dimension` across every returned series, in first-seen order
pub(crate) fn probe_values(response: MetricsResponse, dimension: &DimensionName) -> Vec<DimensionValue> {
    let mut seen = HashSet::new();
    response
        .value
        .into_iter()
        .flat_map(|metric| metric.timeseries)
        .flat_map(|ts| ts.metadatavalues)
        .filter(|m| dimension.matches(&m.name.value))
        .map(|m| DimensionValue::new(m.value))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

pub(crate) fn parse_definitions(response: DefinitionsResponse) -> Vec<MetricDefinition> {
    response
        .value
        .into_iter()
        .map(|def| {
            MetricDefinition::new(
                def.name.value,
                def.dimensions.into_iter().map(|d| DimensionName::new(d.value)),
            )
        })
        .collect()
}

/// Query parameters of a time-series request
pub(crate) fn series_params(query: &TimeSeriesQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("api-version", METRICS_API_VERSION.to_string()),
        ("metricnames", query.metric.clone()),
        ("interval", query.interval.to_string()),
        ("aggregation", query.aggregation.to_string()),
    ];
    if let Some(timespan) = &query.timespan {
        params.push(("timespan", timespan.to_string()));
    }
    if let Some(filter) = query.filter.to_query() {
        params.push(("$filter", filter));
    }
    if let Some(namespace) = &query.namespace {
        params.push(("metricnamespace", namespace.clone()));
    }
    params
}

/// Query parameters of a dimension probe (metadata only, no data points)
pub(crate) fn probe_params(metric: &str, filter: &MetricFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("api-version", METRICS_API_VERSION.to_string()),
        ("metricnames", metric.to_string()),
        ("resultType", "metadata".to_string()),
    ];
    if let Some(filter) = filter.to_query() {
        params.push(("$filter", filter));
    }
    if let Some(namespace) = azmon_common::metrics::namespace_for(metric) {
        params.push(("metricnamespace", namespace.to_string()));
    }
    params
}

/// Azure Monitor metrics client
#[derive(Debug, Clone)]
pub struct MonitorClient {
    context: AzureContext,
}

impl FromAzureContext for MonitorClient {
    fn from_context(ctx: &AzureContext) -> Self {
        Self {
            context: ctx.clone(),
        }
    }
}

impl MonitorClient {
    fn metrics_url(&self, resource_id: &str) -> String {
        self.context
            .url(&format!("{resource_id}/providers/microsoft.insights/metrics"))
    }

    fn definitions_url(&self, resource_id: &str) -> String {
        self.context
            .url(&format!("{resource_id}/providers/microsoft.insights/metricDefinitions"))
    }
}

impl MetricClient for MonitorClient {
    async fn list_time_series(
        &self,
        resource_id: &str,
        query: &TimeSeriesQuery,
    ) -> Result<Vec<TimeSeries>> {
        let response: MetricsResponse = self
            .context
            .get_json(&self.metrics_url(resource_id), &series_params(query))
            .await?;
        let series = parse_time_series(response);
        debug!(metric = %query.metric, series = series.len(), "Fetched time series");
        Ok(series)
    }

    async fn list_dimension_values(
        &self,
        resource_id: &str,
        metric: &str,
        dimension: &DimensionName,
        filter: &MetricFilter,
    ) -> Result<Vec<DimensionValue>> {
        let response: MetricsResponse = self
            .context
            .get_json(&self.metrics_url(resource_id), &probe_params(metric, filter))
            .await?;
        Ok(probe_values(response, dimension))
    }

    async fn list_metric_definitions(&self, resource_id: &str) -> Result<Vec<MetricDefinition>> {
        let params = [("api-version", METRICS_API_VERSION.to_string())];
        let response: DefinitionsResponse = self
            .context
            .get_json(&self.definitions_url(resource_id), &params)
            .await?;
        Ok(parse_definitions(response))
    }
}
