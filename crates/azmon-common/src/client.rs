//! Metric provider boundary
//!
//! [`MetricClient`] abstracts the three provider calls the collectors make so
//! that discovery and sampling can run against a scripted client in tests.

use crate::dimension::{DimensionName, DimensionValue};
use crate::filter::MetricFilter;
use crate::metrics::{Aggregation, Interval, namespace_for};
use crate::timespan::Timespan;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;

/// A metric the resource publishes, with the dimensions it can be split by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub name: String,
    pub dimensions: Vec<DimensionName>,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, dimensions: impl IntoIterator<Item = DimensionName>) -> Self {
        Self {
            name: name.into(),
            dimensions: dimensions.into_iter().collect(),
        }
    }

    /// Whether every requested dimension is supported (names compared case-insensitively)
    pub fn supports_all(&self, requested: &[DimensionName]) -> bool {
        requested
            .iter()
            .all(|r| self.dimensions.iter().any(|d| d.matches(r.as_str())))
    }
}

/// One aggregated data point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub average: Option<f64>,
    pub maximum: Option<f64>,
    pub minimum: Option<f64>,
    pub total: Option<f64>,
    pub count: Option<f64>,
}

impl DataPoint {
    pub fn value(&self, aggregation: Aggregation) -> Option<f64> {
        match aggregation {
            Aggregation::Average => self.average,
            Aggregation::Maximum => self.maximum,
            Aggregation::Minimum => self.minimum,
            Aggregation::Total => self.total,
            Aggregation::Count => self.count,
        }
    }
}

/// A series of points for one combination of dimension values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub metadata: Vec<(DimensionName, DimensionValue)>,
    /// Oldest first, as the provider returns them
    pub points: Vec<DataPoint>,
}

impl TimeSeries {
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.last()
    }
}

/// Parameters of a time-series request
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesQuery {
    pub metric: String,
    pub interval: Interval,
    pub aggregation: Aggregation,
    /// `None` leaves the window to the provider
    pub timespan: Option<Timespan>,
    pub filter: MetricFilter,
    pub namespace: Option<String>,
}

impl TimeSeriesQuery {
    /// Query for `metric`, picking up its namespace override if it has one
    pub fn new(metric: impl Into<String>, aggregation: Aggregation) -> Self {
        let metric = metric.into();
        let namespace = namespace_for(&metric).map(str::to_string);
        Self {
            metric,
            interval: Interval::default(),
            aggregation,
            timespan: None,
            filter: MetricFilter::default(),
            namespace,
        }
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn timespan(mut self, timespan: Option<Timespan>) -> Self {
        self.timespan = timespan;
        self
    }

    pub fn filter(mut self, filter: MetricFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Trait for metric provider operations that can be scripted in tests.
pub trait MetricClient: Send + Sync {
    /// Fetch the time series of one metric for a resource
    fn list_time_series(
        &self,
        resource_id: &str,
        query: &TimeSeriesQuery,
    ) -> impl Future<Output = Result<Vec<TimeSeries>>> + Send;

    /// Distinct values of `dimension` among series matching `filter`.
    ///
    /// `filter` carries the wildcard predicate on `dimension`.
    fn list_dimension_values(
        &self,
        resource_id: &str,
        metric: &str,
        dimension: &DimensionName,
        filter: &MetricFilter,
    ) -> impl Future<Output = Result<Vec<DimensionValue>>> + Send;

    /// Metrics published by a resource, in provider order
    fn list_metric_definitions(
        &self,
        resource_id: &str,
    ) -> impl Future<Output = Result<Vec<MetricDefinition>>> + Send;
}
