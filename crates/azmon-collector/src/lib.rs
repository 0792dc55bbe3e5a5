//! azmon-collector - Azure Monitor collectors for low-level discovery
//!
//! This crate provides the `azmon` binary: single-value metric sampling,
//! dimensional discovery, resource inventories and session-host status
//! against Azure, printed in the form the monitoring agent's external checks
//! expect.

pub mod azure;
pub mod collect;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inventory;
pub mod report;
pub mod sampler;

pub use discovery::{Discovery, DiscoveryEngine};
pub use error::CollectorError;
pub use inventory::{Inventory, InventoryKind};
pub use report::Report;
pub use sampler::MetricSampler;
