use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CollectorError, Result};

/// Control-plane and node components whose host layout is probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// kube-apiserver
    ApiServer,
    /// kube-controller-manager
    ControllerManager,
    /// kube-scheduler
    Scheduler,
    /// etcd
    Etcd,
    /// kube-proxy
    Proxy,
    /// kubelet
    Kubelet,
    /// flannel networking agent
    Flanneld,
}

impl Component {
    /// Every probed component, in probe order
    pub const ALL: [Self; 7] = [
        Self::ApiServer,
        Self::ControllerManager,
        Self::Scheduler,
        Self::Etcd,
        Self::Proxy,
        Self::Kubelet,
        Self::Flanneld,
    ];

    /// Name used in placeholder tokens and the defaults document
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiServer => "apiserver",
            Self::ControllerManager => "controllermanager",
            Self::Scheduler => "scheduler",
            Self::Etcd => "etcd",
            Self::Proxy => "proxy",
            Self::Kubelet => "kubelet",
            Self::Flanneld => "flanneld",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of host fact resolved for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    /// Running binary name
    Binary,
    /// Main configuration file
    Config,
    /// kubeconfig file
    KubeConfig,
    /// Data directory
    DataDir,
    /// Service unit file
    Service,
    /// Directory holding the CA file
    CaDir,
}

impl FactKind {
    /// Every fact kind, in probe order
    pub const ALL: [Self; 6] = [
        Self::Binary,
        Self::Config,
        Self::KubeConfig,
        Self::DataDir,
        Self::Service,
        Self::CaDir,
    ];

    /// Token suffix, e.g. `confs` in `$etcd.confs`
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Binary => "bins",
            Self::Config => "confs",
            Self::KubeConfig => "kubeconfig",
            Self::DataDir => "datadirs",
            Self::Service => "svc",
            Self::CaDir => "cafile",
        }
    }

    /// Whether the resolved path is reduced to its containing directory
    #[must_use]
    pub const fn is_folder(self) -> bool {
        matches!(self, Self::DataDir | Self::CaDir)
    }
}

/// Candidate lists and defaults for one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentParams {
    /// Config file globs
    #[serde(default, rename = "confs")]
    pub configs: Vec<String>,
    /// Fallback config file
    #[serde(default, rename = "defaultconf")]
    pub default_config: String,

    /// kubeconfig globs
    #[serde(default, rename = "kubeconfig")]
    pub kubeconfigs: Vec<String>,
    /// Fallback kubeconfig
    #[serde(default, rename = "defaultkubeconfig")]
    pub default_kubeconfig: String,

    /// Data directory globs
    #[serde(default, rename = "datadirs")]
    pub data_dirs: Vec<String>,
    /// Fallback data directory
    #[serde(default, rename = "defaultdatadir")]
    pub default_data_dir: String,

    /// Binary names to look for among running processes
    #[serde(default, rename = "bins")]
    pub binaries: Vec<String>,
    /// Fallback binary name
    #[serde(default, rename = "defaultbins")]
    pub default_binary: String,

    /// Service unit globs
    #[serde(default, rename = "svc")]
    pub services: Vec<String>,
    /// Fallback service unit
    #[serde(default, rename = "defaultsvc")]
    pub default_service: String,

    /// CA file globs
    #[serde(default, rename = "cafile")]
    pub ca_files: Vec<String>,
    /// Fallback CA file
    #[serde(default, rename = "defaultcafile")]
    pub default_ca_file: String,
}

impl ComponentParams {
    /// Candidates and default for one fact kind
    #[must_use]
    pub fn lookup(&self, kind: FactKind) -> (&[String], &str) {
        match kind {
            FactKind::Binary => (self.binaries.as_slice(), self.default_binary.as_str()),
            FactKind::Config => (self.configs.as_slice(), self.default_config.as_str()),
            FactKind::KubeConfig => (self.kubeconfigs.as_slice(), self.default_kubeconfig.as_str()),
            FactKind::DataDir => (self.data_dirs.as_slice(), self.default_data_dir.as_str()),
            FactKind::Service => (self.services.as_slice(), self.default_service.as_str()),
            FactKind::CaDir => (self.ca_files.as_slice(), self.default_ca_file.as_str()),
        }
    }
}

/// Per-component parameters of the defaults document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeParams {
    #[serde(default)]
    pub apiserver: ComponentParams,
    #[serde(default)]
    pub controllermanager: ComponentParams,
    #[serde(default)]
    pub scheduler: ComponentParams,
    #[serde(default)]
    pub etcd: ComponentParams,
    #[serde(default)]
    pub proxy: ComponentParams,
    #[serde(default)]
    pub kubelet: ComponentParams,
    #[serde(default)]
    pub flanneld: ComponentParams,
}

impl NodeParams {
    /// Parameters of `component`
    #[must_use]
    pub const fn component(&self, component: Component) -> &ComponentParams {
        match component {
            Component::ApiServer => &self.apiserver,
            Component::ControllerManager => &self.controllermanager,
            Component::Scheduler => &self.scheduler,
            Component::Etcd => &self.etcd,
            Component::Proxy => &self.proxy,
            Component::Kubelet => &self.kubelet,
            Component::Flanneld => &self.flanneld,
        }
    }
}

/// The parameter-defaults document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefaults {
    /// Node component parameters
    #[serde(default)]
    pub node: NodeParams,
}

impl ParameterDefaults {
    /// Parse the YAML defaults document
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| CollectorError::Config(format!("parameter defaults: {e}")))
    }
}

/// Resolved substitution table, `$<component>.<kind>` → value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterMap(BTreeMap<String, String>);

impl ParameterMap {
    /// Create an empty map
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Placeholder token for a component fact
    #[must_use]
    pub fn token(component: Component, kind: FactKind) -> String {
        format!("${}.{}", component.as_str(), kind.suffix())
    }

    /// Register a resolved fact. Empty values are not registered.
    pub fn insert(&mut self, component: Component, kind: FactKind, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.0
                .insert(Self::token(component, kind), value.to_string());
        }
    }

    /// Merge another map into this one
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Value registered under a full token such as `$etcd.confs`
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    /// Number of registered tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no token is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every registered token in `text`.
    ///
    /// Both `${etcd.confs}` and `$etcd.confs` are accepted. Longer tokens
    /// are replaced first so a token that prefixes another never clobbers
    /// it. Unknown placeholders are left as they are.
    #[must_use]
    pub fn substitute(&self, text: &str) -> String {
        let mut tokens: Vec<(&String, &String)> = self.0.iter().collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

        let mut out = text.to_string();
        for (token, value) in tokens {
            let bare = token.trim_start_matches('$');
            out = out.replace(&format!("${{{bare}}}"), value);
            out = out.replace(token.as_str(), value);
        }
        out
    }
}

impl FromIterator<(String, String)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
