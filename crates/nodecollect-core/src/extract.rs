//! Values read from the node's live kubelet configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CollectorError, Result};
use crate::types::{ConfigNode, Info, LiveConfigDocument, Scalar, ValueSet, KUBELET_CONFIG_ROOT};

/// Logical collector key → dotted `kubeletconfig.*` path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KubeletMapping(BTreeMap<String, String>);

impl KubeletMapping {
    /// Parse the YAML mapping document
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| CollectorError::Config(format!("kubelet mapping: {e}")))
    }

    /// Iterate `(key, path)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Number of mapped keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for KubeletMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Extract every mapped key present in `doc`.
///
/// Keys whose path is missing at any depth, crosses a non-map node, or ends
/// at `null` are left out.
#[must_use]
pub fn extract(doc: &LiveConfigDocument, mapping: &KubeletMapping) -> ValueSet {
    let mut values = ValueSet::new();
    let Some(root) = doc.kubelet_config() else {
        debug!("live configuration has no kubeletconfig root");
        return values;
    };

    for (key, path) in mapping.iter() {
        match lookup(root, path).and_then(coerce) {
            Some(info) => values.insert(key.clone(), info),
            None => debug!(key = %key, path = %path, "path not present in live configuration"),
        }
    }
    values
}

/// Walk `path` (with or without the `kubeletconfig.` prefix) below `root`
fn lookup<'a>(root: &'a ConfigNode, path: &str) -> Option<&'a ConfigNode> {
    let prefix = format!("{KUBELET_CONFIG_ROOT}.");
    let relative = path.strip_prefix(&prefix).unwrap_or(path);
    relative
        .split('.')
        .try_fold(root, |node, segment| node.child(segment))
}

/// Turn a leaf into collected values.
///
/// A map leaf becomes one JSON text value; values stay within [`Scalar`].
fn coerce(node: &ConfigNode) -> Option<Info> {
    let values = match node {
        ConfigNode::Null => return None,
        ConfigNode::Bool(b) => vec![Scalar::String(b.to_string())],
        ConfigNode::List(items) => items.iter().map(list_element).collect(),
        ConfigNode::Number(_) | ConfigNode::String(_) | ConfigNode::Map(_) => {
            vec![list_element(node)]
        }
    };
    Some(Info::new(values))
}

/// List elements keep their type; composite elements become JSON text
fn list_element(node: &ConfigNode) -> Scalar {
    match node {
        ConfigNode::Bool(b) => Scalar::Bool(*b),
        ConfigNode::Number(n) => Scalar::Number(n.clone()),
        ConfigNode::String(s) => Scalar::String(s.clone()),
        other => Scalar::String(serde_json::Value::from(other.clone()).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NODE_CONFIG: &str = r#"{
  "kubeletconfig": {
    "enableServer": true,
    "staticPodPath": "/etc/kubernetes/manifests",
    "authentication": {
      "x509": {"clientCAFile": "/etc/kubernetes/certs/ca.crt"},
      "webhook": {"enabled": true, "cacheTTL": "2m0s"},
      "anonymous": {"enabled": false}
    },
    "authorization": {"mode": "Webhook"},
    "eventRecordQPS": 0,
    "makeIPTablesUtilChains": true,
    "streamingConnectionIdleTimeout": "4h0m0s",
    "protectKernelDefaults": null,
    "tlsCipherSuites": [
      "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
      "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
      "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305",
      "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
      "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305",
      "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
      "TLS_RSA_WITH_AES_256_GCM_SHA384",
      "TLS_RSA_WITH_AES_128_GCM_SHA256"
    ]
  }
}"#;

    const MAPPING: &str = "
kubeletAnonymousAuthArgumentSet: kubeletconfig.authentication.anonymous.enabled
kubeletAuthorizationModeArgumentSet: kubeletconfig.authorization.mode
kubeletClientCaFileArgumentSet: kubeletconfig.authentication.x509.clientCAFile
kubeletEventQpsArgumentSet: kubeletconfig.eventRecordQPS
kubeletMakeIptablesUtilChainsArgumentSet: kubeletconfig.makeIPTablesUtilChains
kubeletStreamingConnectionIdleTimeoutArgumentSet: kubeletconfig.streamingConnectionIdleTimeout
kubeletOnlyUseStrongCryptographic: kubeletconfig.tlsCipherSuites
kubeletProtectKernelDefaultsArgumentSet: kubeletconfig.protectKernelDefaults
kubeletRotateCertificatesArgumentSet: kubeletconfig.rotateCertificates
kubeletReadOnlyPortArgumentSet: kubeletconfig.readOnlyPort.value
";

    fn values(v: &[serde_json::Value]) -> Info {
        Info::new(v.iter().map(|x| serde_json::from_value(x.clone()).unwrap()).collect())
    }

    #[test]
    fn test_parse_node_config() {
        let doc = LiveConfigDocument::from_slice(NODE_CONFIG.as_bytes()).unwrap();
        let mapping = KubeletMapping::from_yaml(MAPPING).unwrap();
        let got = extract(&doc, &mapping);

        assert_eq!(got.get("kubeletAnonymousAuthArgumentSet"), Some(&values(&[json!("false")])));
        assert_eq!(got.get("kubeletAuthorizationModeArgumentSet"), Some(&values(&[json!("Webhook")])));
        assert_eq!(
            got.get("kubeletClientCaFileArgumentSet"),
            Some(&values(&[json!("/etc/kubernetes/certs/ca.crt")]))
        );
        assert_eq!(got.get("kubeletEventQpsArgumentSet"), Some(&values(&[json!(0)])));
        assert_eq!(got.get("kubeletMakeIptablesUtilChainsArgumentSet"), Some(&values(&[json!("true")])));
        assert_eq!(
            got.get("kubeletStreamingConnectionIdleTimeoutArgumentSet"),
            Some(&values(&[json!("4h0m0s")]))
        );
        assert_eq!(
            got.get("kubeletOnlyUseStrongCryptographic").map(|i| i.values.len()),
            Some(8)
        );
    }

    #[test]
    fn test_missing_paths_are_omitted() {
        let doc = LiveConfigDocument::from_slice(NODE_CONFIG.as_bytes()).unwrap();
        let mapping = KubeletMapping::from_yaml(MAPPING).unwrap();
        let got = extract(&doc, &mapping);

        // absent leaf, absent intermediate map, null leaf
        assert!(!got.contains_key("kubeletRotateCertificatesArgumentSet"));
        assert!(!got.contains_key("kubeletReadOnlyPortArgumentSet"));
        assert!(!got.contains_key("kubeletProtectKernelDefaultsArgumentSet"));
        assert_eq!(got.len(), 7);
    }

    #[test]
    fn test_anonymous_auth_scenario() {
        let doc = LiveConfigDocument::from(
            json!({"kubeletconfig": {"authentication": {"anonymous": {"enabled": false}}}}),
        );
        let mapping: KubeletMapping = [(
            "kubeletAnonymousAuthArgumentSet".to_string(),
            "kubeletconfig.authentication.anonymous.enabled".to_string(),
        )]
        .into_iter()
        .collect();

        let got = extract(&doc, &mapping);
        assert_eq!(
            serde_json::to_value(&got).unwrap(),
            json!({"kubeletAnonymousAuthArgumentSet": {"values": ["false"]}})
        );
    }

    #[test]
    fn test_list_and_scalar_coercion() {
        let doc = LiveConfigDocument::from(
            json!({"kubeletconfig": {"l": ["A", "B"], "n": 0, "f": false, "mixed": [1, true, {"x": 1}]}}),
        );
        let mapping: KubeletMapping = ["l", "n", "f", "mixed"]
            .into_iter()
            .map(|k| (k.to_string(), format!("kubeletconfig.{k}")))
            .collect();
        let got = serde_json::to_value(extract(&doc, &mapping)).unwrap();

        assert_eq!(got["l"], json!({"values": ["A", "B"]}));
        assert_eq!(got["n"], json!({"values": [0]}));
        assert_eq!(got["f"], json!({"values": ["false"]}));
        assert_eq!(got["mixed"], json!({"values": [1, true, "{\"x\":1}"]}));
    }

    #[test]
    fn test_map_leaf_is_json_text() {
        let doc = LiveConfigDocument::from(
            json!({"kubeletconfig": {"featureGates": {"RotateKubeletServerCertificate": true}}}),
        );
        let mapping: KubeletMapping = [(
            "kubeletFeatureGates".to_string(),
            "kubeletconfig.featureGates".to_string(),
        )]
        .into_iter()
        .collect();

        let got = serde_json::to_value(extract(&doc, &mapping)).unwrap();
        assert_eq!(
            got["kubeletFeatureGates"],
            json!({"values": ["{\"RotateKubeletServerCertificate\":true}"]})
        );
    }

    #[test]
    fn test_bad_mapping_is_config_error() {
        let err = KubeletMapping::from_yaml("- not\n- a map\n").unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
    }

    #[test]
    fn test_document_without_root() {
        let doc = LiveConfigDocument::from(json!({"authentication": {}}));
        let mapping = KubeletMapping::from_yaml(MAPPING).unwrap();
        assert!(extract(&doc, &mapping).is_empty());
    }
}
