//! Default configuration values shared by the collectors
//!
//! These constants keep the binary, the REST client and the tests agreeing on
//! endpoints and fallbacks.

use std::time::Duration;

/// Directory holding the `azure_<client>.toml` profiles
pub const DEFAULT_CONF_DIR: &str = "/usr/lib/zabbix/externalscripts/conf";

/// Environment variable overriding [`DEFAULT_CONF_DIR`]
pub const CONF_DIR_ENV: &str = "AZMON_CONF_DIR";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tag key used to find a monitored resource
pub const DEFAULT_TAG_KEY: &str = "sys_id";

/// Azure Resource Manager endpoint (no trailing slash)
pub const ARM_ENDPOINT: &str = "https://management.azure.com";

/// Token audience for Resource Manager calls
pub const ARM_RESOURCE: &str = "https://management.azure.com";

/// Microsoft identity platform authority (no trailing slash)
pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// api-version for `microsoft.insights/metrics` and `metricDefinitions`
pub const METRICS_API_VERSION: &str = "2018-01-01";

/// api-version for subscription resource listing
pub const RESOURCES_API_VERSION: &str = "2021-04-01";

/// api-version for storage file services
pub const STORAGE_API_VERSION: &str = "2021-04-01";

/// api-version for scale sets and their instances
pub const COMPUTE_API_VERSION: &str = "2021-04-01";

/// api-version for managed clusters
pub const CONTAINER_SERVICE_API_VERSION: &str = "2021-03-01";

/// api-version for host pools and their session hosts
pub const DESKTOP_VIRTUALIZATION_API_VERSION: &str = "2021-01-14-preview";

/// Returns the default HTTP timeout
pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
