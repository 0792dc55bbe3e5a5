//! Dimensional discovery
//!
//! Dimensions of a metric are frequently dependent (a `StatusCode` may only
//! exist for some `ApiName`s), so valid combinations cannot be taken as the
//! cross product of each dimension's values. The engine instead expands a
//! frontier of partial assignments breadth-first: for each requested
//! dimension, every partial assignment is probed with its fixed values plus a
//! wildcard on the next dimension, and each returned value extends it.
//!
//! Every failure here, including an unreachable metric-definition listing,
//! is reported with the discovery code rather than the collector's.

use crate::error::CollectorError;
use crate::report::Report;
use azmon_common::dimension::find_duplicate;
use azmon_common::{
    Assignment, DimensionName, DimensionValue, Frontier, MetricClient, MetricDefinition,
    MetricFilter,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of one discovery run
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Metric the probes ran against (selected when none was given)
    pub metric: String,
    /// Every fully assigned, provider-confirmed combination
    pub assignments: Vec<Assignment>,
    /// Number of probes issued
    pub probes: usize,
}

impl Discovery {
    /// Discovery document with one row per assignment
    pub fn to_report(&self) -> Result<Report, CollectorError> {
        Report::document(&self.assignments)
    }
}

/// Breadth-first enumerator of dimension value combinations for one resource
pub struct DiscoveryEngine<'a, C> {
    client: &'a C,
    resource_id: &'a str,
}

impl<'a, C: MetricClient> DiscoveryEngine<'a, C> {
    pub fn new(client: &'a C, resource_id: &'a str) -> Self {
        Self {
            client,
            resource_id,
        }
    }

    async fn definitions(&self) -> Result<Vec<MetricDefinition>, CollectorError> {
        let definitions = self
            .client
            .list_metric_definitions(self.resource_id)
            .await
            .map_err(|e| CollectorError::DefinitionsUnavailable {
                reason: format!("{e:#}"),
            })?;
        debug!(count = definitions.len(), "Fetched metric definitions");
        Ok(definitions)
    }

    /// First metric, in provider order, supporting every requested dimension
    pub async fn select_metric(
        &self,
        dimensions: &[DimensionName],
    ) -> Result<String, CollectorError> {
        self.definitions()
            .await?
            .into_iter()
            .find(|def| def.supports_all(dimensions))
            .map(|def| def.name)
            .ok_or_else(|| CollectorError::MetricNotFound {
                dimensions: join_names(dimensions),
            })
    }

    /// Enumerate every combination of values for `dimensions`, in that order.
    ///
    /// With no dimensions the result is a single empty assignment and no probe
    /// is issued; a named metric is then checked against the resource's
    /// definitions instead, since no probe would notice it is unknown.
    pub async fn discover(
        &self,
        metric: Option<&str>,
        dimensions: &[DimensionName],
    ) -> Result<Discovery, CollectorError> {
        if let Some(dup) = find_duplicate(dimensions) {
            return Err(CollectorError::DuplicateDimension(dup.to_string()));
        }

        let metric = match metric {
            Some(m) if dimensions.is_empty() => self.confirm_metric(m).await?,
            Some(m) => m.to_string(),
            None => self.select_metric(dimensions).await?,
        };
        info!(metric = %metric, dimensions = %join_names(dimensions), "Starting discovery");

        let mut frontier = Frontier::root();
        let mut probes = 0;
        for dimension in dimensions {
            probes += frontier.as_slice().len();
            frontier = self.expand(&metric, &frontier, dimension).await?;
            debug!(
                dimension = %dimension,
                size = frontier.as_slice().len(),
                "Expanded frontier"
            );
        }

        Ok(Discovery {
            metric,
            assignments: frontier.into_assignments(),
            probes,
        })
    }

    /// `metric` as the resource defines it, matched ignoring case
    async fn confirm_metric(&self, metric: &str) -> Result<String, CollectorError> {
        self.definitions()
            .await?
            .into_iter()
            .find(|def| def.name.eq_ignore_ascii_case(metric))
            .map(|def| def.name)
            .ok_or_else(|| CollectorError::UnknownMetric {
                metric: metric.to_string(),
            })
    }

    /// Probe once per partial assignment and extend each with every value found
    async fn expand(
        &self,
        metric: &str,
        frontier: &Frontier,
        dimension: &DimensionName,
    ) -> Result<Frontier, CollectorError> {
        let mut next = Frontier::with_capacity(frontier.as_slice().len());
        for partial in frontier.as_slice() {
            let filter = MetricFilter::probe(partial, dimension);
            let values = self.probe(metric, dimension, &filter).await;
            if values.is_empty() {
                return Err(CollectorError::DimensionWithoutValues {
                    dimension: dimension.to_string(),
                    filter: filter.to_string(),
                });
            }
            // Names were checked for duplicates up front
            for value in values {
                next.push(partial.extend(dimension.clone(), value));
            }
        }
        Ok(next)
    }

    /// Distinct values of `dimension` under `filter`; a failed probe yields none
    async fn probe(
        &self,
        metric: &str,
        dimension: &DimensionName,
        filter: &MetricFilter,
    ) -> Vec<DimensionValue> {
        debug!(metric, filter = %filter, "Probing dimension values");
        match self
            .client
            .list_dimension_values(self.resource_id, metric, dimension, filter)
            .await
        {
            Ok(values) => {
                let mut seen = HashSet::new();
                values.into_iter().filter(|v| seen.insert(v.clone())).collect()
            }
            Err(e) => {
                warn!(metric, filter = %filter, error = %format!("{e:#}"), "Dimension probe failed");
                Vec::new()
            }
        }
    }
}

fn join_names(names: &[DimensionName]) -> String {
    names
        .iter()
        .map(DimensionName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
