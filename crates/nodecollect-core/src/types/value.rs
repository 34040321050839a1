use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single collected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean list element from the live configuration
    Bool(bool),
    /// Numeric value
    Number(serde_json::Number),
    /// Text value; probe output is always text
    String(String),
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// Values collected for one key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Ordered values
    pub values: Vec<Scalar>,
}

impl Info {
    /// Wrap a list of values
    #[must_use]
    pub const fn new(values: Vec<Scalar>) -> Self {
        Self { values }
    }

    /// Split raw command output on `,`.
    ///
    /// Empty output yields one empty string, not an empty list.
    #[must_use]
    pub fn from_output(output: &str) -> Self {
        Self::new(output.split(',').map(Scalar::from).collect())
    }
}

/// Collected values keyed by collector key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueSet(BTreeMap<String, Info>);

impl ValueSet {
    /// Create an empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record values under `key`, replacing any previous entry
    pub fn insert(&mut self, key: impl Into<String>, info: Info) {
        self.0.insert(key.into(), info);
    }

    /// Values recorded under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Info> {
        self.0.get(key)
    }

    /// Returns true if `key` has been recorded
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate keys in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Info)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Info)> for ValueSet {
    fn from_iter<I: IntoIterator<Item = (String, Info)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValueSet {
    type Item = (String, Info);
    type IntoIter = std::collections::btree_map::IntoIter<String, Info>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
