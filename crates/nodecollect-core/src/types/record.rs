use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{NodeRole, ValueSet};

/// Schema version of the output record
pub const RECORD_API_VERSION: &str = "v1";

/// Kind of the output record
pub const RECORD_KIND: &str = "NodeInfo";

/// Compliance snapshot of one node for one spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Always [`RECORD_API_VERSION`]
    pub api_version: String,

    /// Always [`RECORD_KIND`]
    pub kind: String,

    /// Detected node role
    #[serde(rename = "type")]
    pub node_role: NodeRole,

    /// `creationTimestamp` and, when known, `nodeName`
    pub metadata: BTreeMap<String, String>,

    /// Collected values
    pub info: ValueSet,
}

impl NodeRecord {
    /// Wrap merged values into a record stamped with `now`.
    #[must_use]
    pub fn assemble(
        node_role: NodeRole,
        info: ValueSet,
        node_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "creationTimestamp".to_string(),
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        if let Some(name) = node_name.filter(|n| !n.is_empty()) {
            metadata.insert("nodeName".to_string(), name.to_string());
        }

        Self {
            api_version: RECORD_API_VERSION.to_string(),
            kind: RECORD_KIND.to_string(),
            node_role,
            metadata,
            info,
        }
    }

    /// Creation timestamp as written into the metadata
    #[must_use]
    pub fn creation_timestamp(&self) -> Option<&str> {
        self.metadata.get("creationTimestamp").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Info, Scalar};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_assemble_record() {
        let mut info = ValueSet::new();
        info.insert("kubeletAnonymousAuthArgumentSet", Info::new(vec![Scalar::from("false")]));
        let record = NodeRecord::assemble(NodeRole::Worker, info, Some("node-1"), fixed_now());

        assert_eq!(record.api_version, "v1");
        assert_eq!(record.kind, "NodeInfo");
        assert_eq!(record.creation_timestamp(), Some("2024-03-01T12:30:00Z"));
        assert_eq!(record.metadata.get("nodeName").map(String::as_str), Some("node-1"));
    }

    #[test]
    fn test_record_json_shape() {
        let mut info = ValueSet::new();
        info.insert("adminConfFileOwnership", Info::new(vec![Scalar::from("root:root")]));
        let record = NodeRecord::assemble(NodeRole::Master, info, None, fixed_now());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "apiVersion": "v1",
                "kind": "NodeInfo",
                "type": "master",
                "metadata": {"creationTimestamp": "2024-03-01T12:30:00Z"},
                "info": {"adminConfFileOwnership": {"values": ["root:root"]}}
            })
        );
    }

    #[test]
    fn test_empty_node_name_omitted() {
        let record = NodeRecord::assemble(NodeRole::Worker, ValueSet::new(), Some(""), fixed_now());
        assert!(!record.metadata.contains_key("nodeName"));
    }
}
