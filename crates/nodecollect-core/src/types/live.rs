use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::Result;

/// Root key of the kubelet `configz` payload
pub const KUBELET_CONFIG_ROOT: &str = "kubeletconfig";

/// A node of a decoded live-configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// JSON `null`
    Null,
    /// Boolean leaf
    Bool(bool),
    /// Numeric leaf
    Number(serde_json::Number),
    /// String leaf
    String(String),
    /// Ordered list
    List(Vec<ConfigNode>),
    /// Nested object
    Map(BTreeMap<String, ConfigNode>),
}

impl ConfigNode {
    /// Child under `key` if this node is a map
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ConfigNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<ConfigNode> for serde_json::Value {
    fn from(node: ConfigNode) -> Self {
        match node {
            ConfigNode::Null => Self::Null,
            ConfigNode::Bool(b) => Self::Bool(b),
            ConfigNode::Number(n) => Self::Number(n),
            ConfigNode::String(s) => Self::String(s),
            ConfigNode::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            ConfigNode::Map(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// The node's live configuration as returned by the control plane
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct LiveConfigDocument {
    root: ConfigNode,
}

impl LiveConfigDocument {
    /// Decode a raw `configz` response body
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(Self::from(value))
    }

    /// Whole decoded tree
    #[must_use]
    pub const fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// The `kubeletconfig` subtree, if present
    #[must_use]
    pub fn kubelet_config(&self) -> Option<&ConfigNode> {
        self.root.child(KUBELET_CONFIG_ROOT)
    }
}

impl From<serde_json::Value> for LiveConfigDocument {
    fn from(value: serde_json::Value) -> Self {
        Self {
            root: ConfigNode::from(value),
        }
    }
}
