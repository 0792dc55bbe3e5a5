//! Collector failure taxonomy and the code each failure is reported with
//!
//! Collectors never print error details on stdout: the monitoring agent only
//! sees a fixed negative code chosen by [`CollectorError::report_code`].

use azmon_common::Component;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    /// Client profile missing or unreadable, or the token exchange was rejected
    #[error("authentication failed for client '{client}': {reason}")]
    AuthenticationFailure { client: String, reason: String },

    #[error("no {resource_types} resource tagged {tag_key}={tag_value}")]
    ResourceNotFound {
        tag_key: String,
        tag_value: String,
        resource_types: String,
    },

    #[error("no metric on the resource supports dimensions [{dimensions}]")]
    MetricNotFound { dimensions: String },

    #[error("metric '{metric}' is not defined on the resource")]
    UnknownMetric { metric: String },

    #[error("metric definitions unavailable: {reason}")]
    DefinitionsUnavailable { reason: String },

    #[error("dimension '{dimension}' has no values under filter \"{filter}\"")]
    DimensionWithoutValues { dimension: String, filter: String },

    #[error("dimension '{0}' requested more than once")]
    DuplicateDimension(String),

    #[error("metric '{metric}' has no {aggregation} value in its latest data point")]
    NoDataAvailable { metric: String, aggregation: String },

    #[error("{component} has no {kind} inventory")]
    UnsupportedInventory { component: Component, kind: String },

    #[error("no session host named '{host}' in the host pool")]
    SessionHostNotFound { host: String },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl CollectorError {
    /// Failure raised by the discovery engine itself
    pub fn is_discovery(&self) -> bool {
        matches!(
            self,
            CollectorError::MetricNotFound { .. }
                | CollectorError::UnknownMetric { .. }
                | CollectorError::DefinitionsUnavailable { .. }
                | CollectorError::DimensionWithoutValues { .. }
                | CollectorError::DuplicateDimension(_)
        )
    }

    /// Component whose code reports this failure when `invoking` was running
    pub fn component(&self, invoking: Component) -> Component {
        if self.is_discovery() {
            Component::Discovery
        } else if matches!(self, CollectorError::AuthenticationFailure { .. }) {
            Component::AzureClient
        } else {
            invoking
        }
    }

    pub fn report_code(&self, invoking: Component) -> i32 {
        self.component(invoking).code()
    }
}
