use serde::{Deserialize, Serialize};

use super::NodeRole;

/// Node-role filter of an audit entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryRole {
    /// Only collected on control-plane nodes
    #[serde(rename = "master")]
    Master,
    /// Collected on every node
    #[default]
    #[serde(rename = "any", alias = "worker", alias = "node")]
    Any,
}

impl EntryRole {
    /// Whether an entry with this filter runs on a node with `role`
    #[must_use]
    pub const fn applies_to(self, role: NodeRole) -> bool {
        match self {
            Self::Master => role.is_master(),
            Self::Any => true,
        }
    }
}

/// One probe definition inside a spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Output key the values are recorded under
    pub key: String,

    /// Human readable title
    #[serde(default)]
    pub title: String,

    /// Shell one-liner, parameters already substituted once loaded
    pub audit: String,

    /// Which nodes this entry applies to
    #[serde(default)]
    pub node_type: EntryRole,
}

/// A named, versioned benchmark definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDocument {
    /// Benchmark family, e.g. `k8s-cis`
    pub name: String,

    /// Benchmark version, e.g. `1.23`
    pub version: String,

    /// Human readable title
    #[serde(default)]
    pub title: String,

    /// Audit entries in document order
    #[serde(default)]
    pub collectors: Vec<AuditEntry>,
}

impl SpecDocument {
    /// Catalog key of this document
    #[must_use]
    pub fn key(&self) -> SpecKey {
        SpecKey::new(&self.name, &self.version)
    }
}

/// `(name, version)` identity of a spec document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecKey {
    /// Benchmark family
    pub name: String,
    /// Benchmark version
    pub version: String,
}

impl SpecKey {
    /// Create a key from its parts
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse the `<name>-<version>` form used by the version mapping.
    ///
    /// The version is everything after the last `-`, so `rh-cis-1.0`
    /// yields `("rh-cis", "1.0")`.
    #[must_use]
    pub fn parse_compound(s: &str) -> Option<Self> {
        let (name, version) = s.trim().rsplit_once('-')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(name, version))
    }
}

impl std::fmt::Display for SpecKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_role_aliases() {
        for raw in ["worker", "node", "any"] {
            let role: EntryRole = serde_yaml::from_str(raw).unwrap();
            assert_eq!(role, EntryRole::Any, "{raw}");
        }
        let role: EntryRole = serde_yaml::from_str("master").unwrap();
        assert_eq!(role, EntryRole::Master);
    }

    #[test]
    fn test_entry_role_filter() {
        assert!(EntryRole::Master.applies_to(NodeRole::Master));
        assert!(!EntryRole::Master.applies_to(NodeRole::Worker));
        assert!(EntryRole::Any.applies_to(NodeRole::Worker));
        assert!(EntryRole::Any.applies_to(NodeRole::Master));
    }

    #[test]
    fn test_audit_entry_default_role() {
        let entry: AuditEntry =
            serde_yaml::from_str("key: a\ntitle: t\naudit: echo 1\n").unwrap();
        assert_eq!(entry.node_type, EntryRole::Any);
    }

    #[test]
    fn test_parse_compound_key() {
        assert_eq!(
            SpecKey::parse_compound("k8s-cis-1.23.0"),
            Some(SpecKey::new("k8s-cis", "1.23.0"))
        );
        assert_eq!(
            SpecKey::parse_compound("rh-cis-1.0"),
            Some(SpecKey::new("rh-cis", "1.0"))
        );
        assert_eq!(SpecKey::parse_compound("nodash"), None);
        assert_eq!(SpecKey::parse_compound("trailing-"), None);
    }
}
