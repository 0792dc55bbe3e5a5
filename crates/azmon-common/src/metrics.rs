//! Metric query vocabulary: aggregations, time grains and namespaces.
//!
//! These are closed sets on the provider side, so they are enumerations here
//! rather than free-form strings.

use clap::ValueEnum;
use std::fmt;

/// Summarization applied to raw samples within one time grain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Aggregation {
    Average,
    Maximum,
    Minimum,
    Total,
    Count,
}

impl Aggregation {
    /// Field name in a provider data point and value of the `aggregation` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Average => "average",
            Aggregation::Maximum => "maximum",
            Aggregation::Minimum => "minimum",
            Aggregation::Total => "total",
            Aggregation::Count => "count",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO 8601 time grain accepted by the metrics API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Interval {
    #[value(name = "PT1M")]
    OneMinute,
    #[value(name = "PT5M")]
    FiveMinutes,
    #[value(name = "PT15M")]
    FifteenMinutes,
    #[value(name = "PT30M")]
    ThirtyMinutes,
    #[default]
    #[value(name = "PT1H")]
    OneHour,
    #[value(name = "PT6H")]
    SixHours,
    #[value(name = "PT12H")]
    TwelveHours,
    #[value(name = "P1D", alias = "PT1D")]
    OneDay,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::OneMinute => "PT1M",
            Interval::FiveMinutes => "PT5M",
            Interval::FifteenMinutes => "PT15M",
            Interval::ThirtyMinutes => "PT30M",
            Interval::OneHour => "PT1H",
            Interval::SixHours => "PT6H",
            Interval::TwelveHours => "PT12H",
            Interval::OneDay => "P1D",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics that are published outside the resource's default namespace.
///
/// Looked up case-sensitively by metric name, as the provider does.
const NAMESPACE_OVERRIDES: &[(&str, &str)] = &[
    ("PodCount", "insights.container/pods"),
    ("nodesCount", "insights.Container/nodes"),
];

/// Namespace to query `metric_name` in, when it is not the default one
pub fn namespace_for(metric_name: &str) -> Option<&'static str> {
    NAMESPACE_OVERRIDES
        .iter()
        .find(|(name, _)| *name == metric_name)
        .map(|(_, ns)| *ns)
}
