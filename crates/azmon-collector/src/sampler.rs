//! Single-value metric sampling
//!
//! Fetches one window of a metric and reduces it to the integer the
//! monitoring agent stores: the requested aggregation of the most recent data
//! point of the first series, rounded half to even. A query matching no
//! series at all has no data, the same as a series without points.

use crate::error::CollectorError;
use azmon_common::{MetricClient, TimeSeriesQuery};
use tracing::debug;

/// Round to the nearest integer, ties to even (`2.5` → `2`, `3.5` → `4`)
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub struct MetricSampler<'a, C> {
    client: &'a C,
    resource_id: &'a str,
}

impl<'a, C: MetricClient> MetricSampler<'a, C> {
    pub fn new(client: &'a C, resource_id: &'a str) -> Self {
        Self {
            client,
            resource_id,
        }
    }

    pub async fn sample(&self, query: &TimeSeriesQuery) -> Result<i64, CollectorError> {
        debug!(
            metric = %query.metric,
            aggregation = %query.aggregation,
            interval = %query.interval,
            filter = %query.filter,
            "Sampling metric"
        );
        let series = self
            .client
            .list_time_series(self.resource_id, query)
            .await?;

        let first = series
            .first()
            .ok_or_else(|| CollectorError::NoDataAvailable {
                metric: query.metric.clone(),
                aggregation: query.aggregation.to_string(),
            })?;

        let value = first
            .latest()
            .and_then(|point| point.value(query.aggregation))
            .ok_or_else(|| CollectorError::NoDataAvailable {
                metric: query.metric.clone(),
                aggregation: query.aggregation.to_string(),
            })?;

        debug!(value, points = first.points.len(), "Latest data point");
        Ok(round_half_even(value))
    }
}
