//! Azure client modules for the collectors
//!
//! This module provides the REST plumbing behind the collectors:
//! - auth: Client profiles and the client-credentials token exchange
//! - context: Authenticated Resource Manager context and paged listings
//! - inventory: Child resource listings (file services, instances, hosts)
//! - monitor: Azure Monitor metrics client
//! - resources: Tag-based resource resolution

pub mod auth;
pub mod context;
pub mod error;
pub mod inventory;
pub mod monitor;
pub mod resources;

pub use auth::{AccessToken, ClientProfile, CredentialProvider, extract_client_name};
pub use context::{AzureContext, Page};
pub use error::{AzureError, classify_response};
pub use inventory::{InventoryClient, NamedResource, ScaleSetVm, SessionHost, resource_name};
pub use monitor::MonitorClient;
pub use resources::{ResourceResolver, with_sub_resource};

/// Service clients constructed from a shared [`AzureContext`]
pub trait FromAzureContext {
    fn from_context(ctx: &AzureContext) -> Self;
}
