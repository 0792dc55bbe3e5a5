//! Configuration types for the collectors

use azmon_common::defaults::{DEFAULT_CONF_DIR, DEFAULT_TAG_KEY, default_timeout};
use azmon_common::{Aggregation, Component, Interval, MetricFilter, Timespan, TimeSeriesQuery};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Directory holding the client profiles
    pub conf_dir: PathBuf,
    /// HTTP timeout for every request
    pub timeout: Duration,
    /// Tag key identifying the monitored resource
    pub tag_key: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from(DEFAULT_CONF_DIR),
            timeout: default_timeout(),
            tag_key: DEFAULT_TAG_KEY.to_string(),
        }
    }
}

/// Which resource a collector runs against
#[derive(Debug, Clone)]
pub struct Target {
    pub component: Component,
    /// Tag value the resource carries under the configured tag key
    pub sys_id: String,
    pub client_name: String,
    /// Explicit resource id, skipping tag resolution
    pub resource_id: Option<String>,
    /// Child path appended to the resolved id (e.g. `fileServices/default`)
    pub sub_resource: Option<String>,
}

/// Parameters of `azmon sample`
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub metric: String,
    pub aggregation: Aggregation,
    pub interval: Interval,
    pub timespan: Option<Timespan>,
    pub filters: Vec<(String, String)>,
}

impl SampleConfig {
    /// Explicit window, else the previous-day window for components that use it
    pub fn effective_timespan(&self, component: Component, now: DateTime<Utc>) -> Option<Timespan> {
        self.timespan.or_else(|| {
            component
                .samples_since_previous_day()
                .then(|| Timespan::since_previous_day(now))
        })
    }

    pub fn query(&self, component: Component, now: DateTime<Utc>) -> TimeSeriesQuery {
        TimeSeriesQuery::new(component.metric_name(&self.metric), self.aggregation)
            .interval(self.interval)
            .timespan(self.effective_timespan(component, now))
            .filter(MetricFilter::from_pairs(self.filters.iter().cloned()))
    }
}

/// Parameters of `azmon discover`
#[derive(Debug, Clone)]
pub struct DiscoverConfig {
    /// Metric to probe; selected from the resource's definitions when absent
    pub metric: Option<String>,
    /// Raw `+`-separated dimension list
    pub dimensions: String,
}

/// Component named by raw command-line arguments, for reporting a failure to
/// parse them.
///
/// Reads `--component X` or `--component=X`; the `session-host` subcommand
/// always runs as the virtual desktop collector.
pub fn component_from_args<I, S>(args: I) -> Option<Component>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref().to_string_lossy().into_owned();
        if arg == "session-host" {
            return Some(Component::Wvd);
        }
        let value = match arg.strip_prefix("--component") {
            Some("") => args.next().map(|v| v.as_ref().to_string_lossy().into_owned()),
            Some(rest) => rest.strip_prefix('=').map(str::to_string),
            None => None,
        };
        if let Some(value) = value {
            return <Component as ValueEnum>::from_str(&value, true).ok();
        }
    }
    None
}

/// Parse a `Name=Value` filter argument
pub fn parse_filter_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Name=Value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty dimension name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
