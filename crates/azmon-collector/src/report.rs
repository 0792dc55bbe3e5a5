//! Protocol output of one invocation
//!
//! Whatever happens, exactly one line goes to stdout: the sampled value, the
//! discovery document, or a failure code.

use crate::error::CollectorError;
use azmon_common::{Assignment, Component, lld};
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Value(i64),
    Document(String),
    Failure(i32),
}

impl Report {
    /// Discovery document listing `rows`
    pub fn document(rows: &[Assignment]) -> Result<Self, CollectorError> {
        lld::render(rows).map(Report::Document).map_err(|e| {
            CollectorError::Unknown(anyhow::Error::new(e).context("rendering discovery"))
        })
    }

    /// Map an outcome to its output, logging the failure details to stderr
    pub fn from_outcome(component: Component, outcome: Result<Report, CollectorError>) -> Self {
        match outcome {
            Ok(report) => report,
            Err(e) => {
                let code = e.report_code(component);
                error!(component = %component, code, "{e:#}");
                Report::Failure(code)
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Value(v) => write!(f, "{v}"),
            Report::Document(doc) => f.write_str(doc),
            Report::Failure(code) => write!(f, "{code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Report::Value(13).to_string(), "13");
        assert_eq!(Report::Failure(-102).to_string(), "-102");
        assert_eq!(
            Report::Document(r#"{"data":[]}"#.into()).to_string(),
            r#"{"data":[]}"#
        );
    }

    #[test]
    fn test_document_of_rows() {
        let rows = vec![Assignment::from_pairs([("ClusterName", "aks-prod")])];
        assert_eq!(
            Report::document(&rows).unwrap(),
            Report::Document(r#"{"data":[{"{#CLUSTERNAME}":"aks-prod"}]}"#.into())
        );
        assert_eq!(
            Report::document(&[]).unwrap().to_string(),
            r#"{"data":[]}"#
        );
    }

    #[test]
    fn test_failures_become_codes() {
        let outcome = Err(CollectorError::DuplicateDimension("Region".into()));
        assert_eq!(
            Report::from_outcome(Component::Aks, outcome),
            Report::Failure(-102)
        );

        // A filter matching no series is a failure of the collector, not silence
        let outcome = Err(CollectorError::NoDataAvailable {
            metric: "node_cpu_usage_percentage".into(),
            aggregation: "average".into(),
        });
        assert_eq!(
            Report::from_outcome(Component::Aks, outcome),
            Report::Failure(-12)
        );

        assert_eq!(
            Report::from_outcome(Component::Aks, Ok(Report::Value(4))),
            Report::Value(4)
        );
    }
}
