use serde::{Deserialize, Serialize};

/// Normalized identity of the cluster distribution and its release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformVersion {
    /// Distribution name (e.g. `k8s`, `eks`, `rke2`)
    pub name: String,

    /// Release reduced to `major.minor`
    pub version: String,
}

impl std::fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Role of the node the collector runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Control-plane node running the API server
    Master,
    /// Any other node
    Worker,
}

impl NodeRole {
    /// Returns true for control-plane nodes
    #[must_use]
    pub const fn is_master(self) -> bool {
        matches!(self, Self::Master)
    }
}

impl Default for NodeRole {
    fn default() -> Self {
        Self::Worker
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// Response of the API server's `/version` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerVersion {
    /// Major version as reported (may carry a `+` suffix)
    #[serde(default)]
    pub major: String,

    /// Minor version as reported (may carry a `+` suffix)
    #[serde(default)]
    pub minor: String,

    /// Full build version, e.g. `v1.23.17-eks-8ccc7ba`
    pub git_version: String,

    /// Build platform, e.g. `linux/amd64`
    #[serde(default)]
    pub platform: Option<String>,
}
