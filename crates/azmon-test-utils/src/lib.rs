//! Shared test utilities for azmon
//!
//! This crate provides test doubles and fixtures that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`fake`]: Scripted in-memory [`MetricClient`](azmon_common::MetricClient)
//! - [`fixtures`]: Canned data sets and data points
//! - [`stub`]: Loopback HTTP server with canned Resource Manager responses

pub mod fake;
pub mod fixtures;
pub mod stub;

// Re-export commonly used items
pub use fake::FakeMetricClient;
pub use fixtures::{point, region_status_rows, series};
pub use stub::{ArmStub, RunningStub};
