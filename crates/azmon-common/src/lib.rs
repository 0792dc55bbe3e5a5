//! azmon-common - Shared types for the Azure Monitor collectors
//!
//! This crate holds everything that is independent of the HTTP transport:
//! the dimension data model, filter syntax, discovery output, registries and
//! the [`MetricClient`] boundary.
//!
//! ## Modules
//!
//! - [`client`]: Metric provider trait and its data types
//! - [`component`]: Collector registry and failure codes
//! - [`defaults`]: Default configuration values and endpoints
//! - [`dimension`]: Dimension names, values and shared assignments
//! - [`filter`]: Dimension filters in the provider's syntax
//! - [`lld`]: Low-level discovery JSON output
//! - [`metrics`]: Aggregations, intervals and namespace overrides
//! - [`tags`]: Resource tag lookup
//! - [`timespan`]: Explicit query windows

pub mod client;
pub mod component;
pub mod defaults;
pub mod dimension;
pub mod filter;
pub mod lld;
pub mod metrics;
pub mod tags;
pub mod timespan;

// Re-export commonly used types
pub use client::{DataPoint, MetricClient, MetricDefinition, TimeSeries, TimeSeriesQuery};
pub use component::Component;
pub use dimension::{Assignment, DimensionName, DimensionValue, Frontier};
pub use filter::{MetricFilter, Predicate};
pub use metrics::{Aggregation, Interval};
pub use timespan::Timespan;
