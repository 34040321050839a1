//! Choosing the spec that applies to a node.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::catalog::SpecCatalog;
use crate::error::{CollectorError, Result};
use crate::types::{PlatformVersion, SpecDocument, SpecKey};
use crate::version::parse_major_minor;

/// Comparison applied between the cluster version and a rule threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equal
    #[default]
    #[serde(rename = "==", alias = "=", alias = "")]
    Eq,
    /// Not equal
    #[serde(rename = "!=")]
    Ne,
    /// Greater than
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal
    #[serde(rename = ">=")]
    Ge,
    /// Less than
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal
    #[serde(rename = "<=")]
    Le,
}

impl CompareOp {
    /// Whether `ordering` (cluster compared to threshold) satisfies the op
    #[must_use]
    pub const fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Ne => !matches!(ordering, Ordering::Equal),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Ge => !matches!(ordering, Ordering::Less),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Le => !matches!(ordering, Ordering::Greater),
        }
    }
}

/// One row of the version-mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Threshold cluster version (`major.minor[...]`)
    pub cluster_version: String,

    /// Comparison between the cluster version and the threshold
    #[serde(default)]
    pub op: CompareOp,

    /// Spec in `<name>-<version>` form
    pub spec: String,
}

impl MappingRule {
    /// Whether this rule applies to a cluster at `version` (`major.minor`)
    pub fn matches(&self, version: &str) -> Result<bool> {
        let cluster = parse_major_minor(version)?;
        let threshold = parse_major_minor(&self.cluster_version)?;
        Ok(self.op.matches(cluster.cmp(&threshold)))
    }
}

/// The version-mapping document: platform name → ordered rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMapping {
    /// Rules per platform, evaluated in order
    #[serde(default)]
    pub version_mapping: BTreeMap<String, Vec<MappingRule>>,
}

impl VersionMapping {
    /// Parse the YAML mapping document
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| CollectorError::Config(format!("version mapping: {e}")))
    }

    /// Spec key for `platform`, from the first matching rule
    pub fn spec_for(&self, platform: &PlatformVersion) -> Result<Option<SpecKey>> {
        let Some(rules) = self.version_mapping.get(&platform.name) else {
            debug!(platform = %platform.name, "no version mapping for platform");
            return Ok(None);
        };

        for rule in rules {
            if rule.matches(&platform.version)? {
                let key = SpecKey::parse_compound(&rule.spec).ok_or_else(|| {
                    CollectorError::Config(format!(
                        "version mapping spec {:?} is not <name>-<version>",
                        rule.spec
                    ))
                })?;
                return Ok(Some(key));
            }
        }
        Ok(None)
    }
}

/// Explicit selection supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecRequest {
    /// Spec name, e.g. `k8s-cis`
    pub name: Option<String>,
    /// Spec version, e.g. `1.23`
    pub version: Option<String>,
}

impl SpecRequest {
    /// The explicit key, only when both parts are non-empty
    #[must_use]
    pub fn explicit_key(&self) -> Option<SpecKey> {
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let version = self.version.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(SpecKey::new(name, version))
    }
}

/// Decide which key to look up for this run
pub fn select_key(
    request: &SpecRequest,
    platform: &PlatformVersion,
    mapping: &VersionMapping,
) -> Result<Option<SpecKey>> {
    if let Some(key) = request.explicit_key() {
        debug!(spec = %key, "using explicitly requested spec");
        return Ok(Some(key));
    }
    mapping.spec_for(platform)
}

/// Pick the spec document for this run.
///
/// `Ok(None)` means no benchmark is known for the platform and version;
/// the run then produces no records.
pub fn select<'a>(
    catalog: &'a SpecCatalog,
    request: &SpecRequest,
    platform: &PlatformVersion,
    mapping: &VersionMapping,
) -> Result<Option<&'a SpecDocument>> {
    let Some(key) = select_key(request, platform, mapping)? else {
        info!(platform = %platform, "no spec mapped for platform");
        return Ok(None);
    };

    let doc = catalog.get(&key);
    match doc {
        Some(_) => info!(spec = %key, platform = %platform, "selected spec"),
        None => info!(spec = %key, "spec not present in catalog"),
    }
    Ok(doc)
}
