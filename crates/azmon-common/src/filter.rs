//! Metric dimension filters
//!
//! A [`MetricFilter`] is a conjunction of equality predicates over dimensions,
//! optionally with one wildcard predicate. Rendered in the provider's OData
//! syntax: `Region eq 'west' and StatusCode eq '*'`.

use crate::dimension::{Assignment, DimensionName, DimensionValue};
use std::fmt;

/// Value matched by the wildcard predicate
pub const WILDCARD: &str = "*";

/// One term of a [`MetricFilter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `name eq 'value'`
    Equals(DimensionName, DimensionValue),
    /// `name eq '*'`: split results by this dimension
    Wildcard(DimensionName),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals(name, value) => {
                write!(f, "{name} eq '{}'", escape_literal(value.as_str()))
            }
            Predicate::Wildcard(name) => write!(f, "{name} eq '{WILDCARD}'"),
        }
    }
}

/// Boolean AND of dimension predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricFilter {
    predicates: Vec<Predicate>,
}

impl MetricFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter used to probe the values of `dimension` under a partial assignment:
    /// one equality per fixed dimension, then the wildcard.
    pub fn probe(fixed: &Assignment, dimension: &DimensionName) -> Self {
        let mut predicates: Vec<Predicate> = fixed
            .pairs()
            .into_iter()
            .map(|(name, value)| Predicate::Equals(name.clone(), value.clone()))
            .collect();
        predicates.push(Predicate::Wildcard(dimension.clone()));
        Self { predicates }
    }

    /// Filter fixing every given dimension to a value
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<DimensionName>,
        V: Into<DimensionValue>,
    {
        Self {
            predicates: pairs
                .into_iter()
                .map(|(n, v)| Predicate::Equals(n.into(), v.into()))
                .collect(),
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Rendered filter, or `None` when there is nothing to filter on
    pub fn to_query(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl fmt::Display for MetricFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

/// OData string literals escape a single quote by doubling it
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
