//! Dimension names, values and assignments
//!
//! An [`Assignment`] is an ordered, duplicate-free mapping from dimension name
//! to observed value. It is stored as a persistent chain: every node holds one
//! pair plus a shared reference to its parent, so [`Assignment::extend`] is
//! O(1) and all children of one partial assignment share the same prefix.
//! [`Assignment::try_extend`] additionally checks for a repeated name, which
//! walks the chain.

use std::fmt;
use std::sync::Arc;

/// Name of a breakdown axis of a metric (e.g. `StatusCode`, `Region`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionName(String);

impl DimensionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Provider dimension names compare case-insensitively
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for DimensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DimensionName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DimensionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for DimensionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Value observed for a dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionValue(String);

impl DimensionValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for DimensionValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a `+`-separated dimension list (`Region+StatusCode`).
///
/// Empty segments are dropped, so an empty string yields no dimensions.
pub fn parse_dimension_list(raw: &str) -> Vec<DimensionName> {
    raw.split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(DimensionName::from)
        .collect()
}

/// Return the first name that appears more than once, if any.
pub fn find_duplicate(names: &[DimensionName]) -> Option<&DimensionName> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].iter().any(|prev| prev.matches(name.as_str())))
        .map(|(_, name)| name)
}

#[derive(Debug)]
struct Node {
    parent: Assignment,
    name: DimensionName,
    value: DimensionValue,
    len: usize,
}

/// Ordered, duplicate-free dimension → value mapping with a shared prefix.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    head: Option<Arc<Node>>,
}

impl Assignment {
    /// The empty assignment (root of every search)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of assigned dimensions
    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |n| n.len)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Extend with one more pair, sharing `self` as the prefix.
    ///
    /// The caller guarantees `name` is not assigned yet; see [`Self::try_extend`].
    pub fn extend(&self, name: DimensionName, value: DimensionValue) -> Self {
        Self {
            head: Some(Arc::new(Node {
                parent: self.clone(),
                name,
                value,
                len: self.len() + 1,
            })),
        }
    }

    /// Like [`Self::extend`], but `None` if `name` is already assigned.
    ///
    /// O(len): the whole chain is searched for `name`.
    pub fn try_extend(&self, name: DimensionName, value: DimensionValue) -> Option<Self> {
        (!self.contains(&name)).then(|| self.extend(name, value))
    }

    /// Build from pairs in order, skipping any name that is already assigned
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<DimensionName>,
        V: Into<DimensionValue>,
    {
        pairs.into_iter().fold(Self::empty(), |acc, (name, value)| {
            acc.try_extend(name.into(), value.into()).unwrap_or(acc)
        })
    }

    pub fn contains(&self, name: &DimensionName) -> bool {
        self.nodes().any(|n| n.name.matches(name.as_str()))
    }

    /// Value assigned to `name`, if any
    pub fn get(&self, name: &str) -> Option<&DimensionValue> {
        self.nodes().find(|n| n.name.matches(name)).map(|n| &n.value)
    }

    /// Pairs in the order they were assigned
    pub fn pairs(&self) -> Vec<(&DimensionName, &DimensionValue)> {
        let mut pairs: Vec<_> = self.nodes().map(|n| (&n.name, &n.value)).collect();
        pairs.reverse();
        pairs
    }

    /// Nodes from the most recent assignment back to the root
    fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.head.as_deref(), |&n| n.parent.head.as_deref())
    }

    /// Whether `self` and `other` share the same prefix node (same parent allocation)
    pub fn shares_parent_with(&self, other: &Assignment) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => match (&a.parent.head, &b.parent.head) {
                (Some(pa), Some(pb)) => Arc::ptr_eq(pa, pb),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.pairs() == other.pairs()
    }
}

impl Eq for Assignment {}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.pairs().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}

/// Working set of partial assignments at one level of the search
#[derive(Debug, Clone)]
pub struct Frontier {
    entries: Vec<Assignment>,
}

impl Frontier {
    /// A frontier holding only the empty assignment
    pub fn root() -> Self {
        Self {
            entries: vec![Assignment::empty()],
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, assignment: Assignment) {
        self.entries.push(assignment);
    }

    pub fn as_slice(&self) -> &[Assignment] {
        &self.entries
    }

    pub fn into_assignments(self) -> Vec<Assignment> {
        self.entries
    }
}
