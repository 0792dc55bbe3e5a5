//! Scripted in-memory metric provider
//!
//! [`FakeMetricClient`] answers dimension probes from a table of known
//! dimension combinations, the same way the provider answers them from the
//! series it holds: the values of the probed dimension among all rows that
//! agree with the filter's fixed predicates, in first-seen order.

use anyhow::{Result, anyhow};
use azmon_common::{
    DimensionName, DimensionValue, MetricClient, MetricDefinition, MetricFilter, Predicate,
    TimeSeries, TimeSeriesQuery,
};
use std::collections::HashSet;
use std::sync::Mutex;

/// A probe as the fake saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedProbe {
    pub resource_id: String,
    pub metric: String,
    pub dimension: String,
    pub filter: String,
}

/// Scripted [`MetricClient`] that records every call
#[derive(Debug, Default)]
pub struct FakeMetricClient {
    rows: Vec<Vec<(DimensionName, DimensionValue)>>,
    definitions: Vec<MetricDefinition>,
    series: Vec<TimeSeries>,
    failing_filters: HashSet<String>,
    series_error: Option<String>,
    definitions_error: Option<String>,
    probes: Mutex<Vec<RecordedProbe>>,
    queries: Mutex<Vec<TimeSeriesQuery>>,
    definition_requests: Mutex<usize>,
}

impl FakeMetricClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known dimension combinations, each row one series' metadata
    pub fn with_rows<I, R>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (&'static str, &'static str)>,
    {
        self.rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(n, v)| (DimensionName::from(n), DimensionValue::from(v)))
                    .collect()
            })
            .collect();
        self
    }

    pub fn with_definition(mut self, name: &str, dimensions: &[&str]) -> Self {
        self.definitions.push(MetricDefinition::new(
            name,
            dimensions.iter().map(|d| DimensionName::from(*d)),
        ));
        self
    }

    /// Series returned by every time-series request
    pub fn with_series(mut self, series: Vec<TimeSeries>) -> Self {
        self.series = series;
        self
    }

    /// Make the probe with this rendered filter fail
    pub fn fail_probe(mut self, filter: &str) -> Self {
        self.failing_filters.insert(filter.to_string());
        self
    }

    pub fn fail_series(mut self, message: &str) -> Self {
        self.series_error = Some(message.to_string());
        self
    }

    pub fn fail_definitions(mut self, message: &str) -> Self {
        self.definitions_error = Some(message.to_string());
        self
    }

    /// Probes received so far, in call order
    pub fn probes(&self) -> Vec<RecordedProbe> {
        self.probes.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Rendered filters of the probes received so far
    pub fn probe_filters(&self) -> Vec<String> {
        self.probes().into_iter().map(|p| p.filter).collect()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().map(|p| p.len()).unwrap_or_default()
    }

    /// Number of metric-definition listings requested so far
    pub fn definition_requests(&self) -> usize {
        self.definition_requests.lock().map(|n| *n).unwrap_or_default()
    }

    /// Time-series queries received so far
    pub fn queries(&self) -> Vec<TimeSeriesQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn row_matches(row: &[(DimensionName, DimensionValue)], filter: &MetricFilter) -> bool {
        filter.predicates().iter().all(|predicate| match predicate {
            Predicate::Equals(name, value) => row
                .iter()
                .any(|(n, v)| n.matches(name.as_str()) && v == value),
            Predicate::Wildcard(name) => row.iter().any(|(n, _)| n.matches(name.as_str())),
        })
    }

    fn values_for(&self, dimension: &DimensionName, filter: &MetricFilter) -> Vec<DimensionValue> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|row| Self::row_matches(row, filter))
            .filter_map(|row| {
                row.iter()
                    .find(|(n, _)| n.matches(dimension.as_str()))
                    .map(|(_, v)| v.clone())
            })
            .filter(|v| seen.insert(v.clone()))
            .collect()
    }
}

impl MetricClient for FakeMetricClient {
    async fn list_time_series(
        &self,
        _resource_id: &str,
        query: &TimeSeriesQuery,
    ) -> Result<Vec<TimeSeries>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        match &self.series_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(self.series.clone()),
        }
    }

    async fn list_dimension_values(
        &self,
        resource_id: &str,
        metric: &str,
        dimension: &DimensionName,
        filter: &MetricFilter,
    ) -> Result<Vec<DimensionValue>> {
        let rendered = filter.to_string();
        if let Ok(mut probes) = self.probes.lock() {
            probes.push(RecordedProbe {
                resource_id: resource_id.to_string(),
                metric: metric.to_string(),
                dimension: dimension.to_string(),
                filter: rendered.clone(),
            });
        }
        if self.failing_filters.contains(&rendered) {
            return Err(anyhow!("scripted failure for filter {rendered}"));
        }
        Ok(self.values_for(dimension, filter))
    }

    async fn list_metric_definitions(&self, _resource_id: &str) -> Result<Vec<MetricDefinition>> {
        if let Ok(mut n) = self.definition_requests.lock() {
            *n += 1;
        }
        match &self.definitions_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(self.definitions.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::region_status_rows;
    use azmon_common::Assignment;

    #[tokio::test]
    async fn test_probe_values_follow_fixed_dimensions() {
        let client = FakeMetricClient::new().with_rows(region_status_rows());
        let status = DimensionName::from("Status");

        let west = Assignment::empty().extend("Region".into(), "west".into());
        let values = client
            .list_dimension_values("r", "m", &status, &MetricFilter::probe(&west, &status))
            .await
            .unwrap();
        assert_eq!(values, vec![DimensionValue::from("ok"), DimensionValue::from("fail")]);

        let unfiltered = MetricFilter::probe(&Assignment::empty(), &status);
        let all = client
            .list_dimension_values("r", "m", &status, &unfiltered)
            .await
            .unwrap();
        assert_eq!(all, vec![DimensionValue::from("ok"), DimensionValue::from("fail")]);

        assert_eq!(client.probe_count(), 2);
        assert_eq!(
            client.probe_filters(),
            vec!["Region eq 'west' and Status eq '*'", "Status eq '*'"]
        );
    }

    #[tokio::test]
    async fn test_scripted_probe_failure() {
        let client = FakeMetricClient::new()
            .with_rows(region_status_rows())
            .fail_probe("Region eq '*'");
        let region = DimensionName::from("Region");
        let filter = MetricFilter::probe(&Assignment::empty(), &region);
        let result = client
            .list_dimension_values("r", "m", &region, &filter)
            .await;
        assert!(result.is_err());
        assert_eq!(client.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_series_records_queries() {
        let client = FakeMetricClient::new();
        let query = TimeSeriesQuery::new("Requests", azmon_common::Aggregation::Total);
        assert!(client.list_time_series("r", &query).await.unwrap().is_empty());
        assert_eq!(client.queries(), vec![query]);
    }
}
