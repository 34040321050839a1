//! The collection pipeline.
//!
//! ```text
//! cluster version ─► platform ─┐
//! shell ─► role, parameters ───┼─► catalog ─► spec ─► audits ─┐
//! live config ─► extract ──────┴──────────────────────────────┴─► merge ─► record
//! ```

use std::time::Duration;

use chrono::Utc;
use nodecollect_core::{
    extract::extract, merge::merge, selector, version::resolve_platform, AssetProvider,
    CollectorError, KubeletMapping, LiveConfigSource, NoLiveConfig, NodeRecord,
    ParameterDefaults, Result, Shell, SpecCatalog, SpecRequest, ValueSet, VersionMapping,
};
use nodecollect_host::{detect_role, probe_parameters, run_audits, HostShell};
use tracing::{debug, info, warn};

use crate::assets::EmbeddedAssets;

/// Default upper bound for a whole run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Inputs of one collection run
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// Platform target, e.g. `k8s`, `eks`
    pub platform: String,

    /// Raw cluster version, e.g. `v1.23.17-eks-8ccc7ba`
    pub cluster_version: String,

    /// Explicit spec choice; empty means use the version mapping
    pub spec: SpecRequest,

    /// Node the record describes; also used for the live config fetch
    pub node_name: Option<String>,

    /// Deadline for the whole run
    pub timeout: Duration,
}

impl CollectRequest {
    /// Request for `platform` at `cluster_version` with default settings
    #[must_use]
    pub fn new(platform: impl Into<String>, cluster_version: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            cluster_version: cluster_version.into(),
            spec: SpecRequest::default(),
            node_name: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Select a spec explicitly
    #[must_use]
    pub fn spec(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.spec = SpecRequest {
            name: Some(name.into()),
            version: Some(version.into()),
        };
        self
    }

    /// Set the node name
    #[must_use]
    pub fn node_name(mut self, name: impl Into<String>) -> Self {
        self.node_name = Some(name.into());
        self
    }

    /// Set the run deadline
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs the collection pipeline against a shell, a live-config source and
/// a set of assets
pub struct Collector {
    shell: Box<dyn Shell>,
    live: Box<dyn LiveConfigSource>,
    assets: Box<dyn AssetProvider>,
}

impl Collector {
    /// Assemble a collector from its capabilities
    pub fn new(
        shell: impl Shell + 'static,
        live: impl LiveConfigSource + 'static,
        assets: impl AssetProvider + 'static,
    ) -> Self {
        Self {
            shell: Box::new(shell),
            live: Box::new(live),
            assets: Box::new(assets),
        }
    }

    /// Local `sh`, bundled assets, no API access
    #[must_use]
    pub fn local() -> Self {
        Self::new(HostShell::new(), NoLiveConfig, EmbeddedAssets)
    }

    /// Replace the live-config source
    #[must_use]
    pub fn with_live_config(mut self, live: impl LiveConfigSource + 'static) -> Self {
        self.live = Box::new(live);
        self
    }

    /// Replace the asset provider
    #[must_use]
    pub fn with_assets(mut self, assets: impl AssetProvider + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    /// Run the pipeline within `request.timeout`.
    ///
    /// Returns one record per selected spec; an empty list when no spec is
    /// known for the platform and version.
    pub async fn run(&self, request: &CollectRequest) -> Result<Vec<NodeRecord>> {
        let secs = request.timeout.as_secs();
        tokio::time::timeout(request.timeout, self.collect(request))
            .await
            .map_err(|_| CollectorError::DeadlineExceeded(secs))?
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Vec<NodeRecord>> {
        let shell = self.shell.as_ref();
        let assets = self.assets.as_ref();

        let platform = resolve_platform(&request.platform, &request.cluster_version)?;
        info!(platform = %platform, "collecting");

        let defaults = ParameterDefaults::from_yaml(&assets.parameter_defaults()?)?;
        let role = detect_role(shell, &defaults.node.apiserver.binaries).await?;
        info!(role = %role, "node role detected");

        let params = probe_parameters(shell, &defaults.node).await;
        debug!(resolved = params.len(), "parameters probed");

        let catalog = SpecCatalog::load(assets, &platform.name, &params)?;
        let mapping = if request.spec.explicit_key().is_some() {
            VersionMapping::default()
        } else {
            VersionMapping::from_yaml(&assets.version_mapping()?)?
        };

        let Some(spec) = selector::select(&catalog, &request.spec, &platform, &mapping)? else {
            return Ok(Vec::new());
        };

        let probed = run_audits(shell, spec, role).await?;
        let live = self.live_values(request.node_name.as_deref()).await?;
        let info = merge(&probed, &live);

        let record = NodeRecord::assemble(role, info, request.node_name.as_deref(), Utc::now());
        Ok(vec![record])
    }

    async fn live_values(&self, node_name: Option<&str>) -> Result<ValueSet> {
        let node = node_name.unwrap_or_default();
        match self.live.fetch(node).await {
            Ok(doc) => {
                let mapping = KubeletMapping::from_yaml(&self.assets.kubelet_mapping()?)?;
                let values = extract(&doc, &mapping);
                debug!(overrides = values.len(), "live configuration applied");
                Ok(values)
            }
            Err(e) => {
                warn!(error = %e, "live configuration not available, using probed values only");
                Ok(ValueSet::new())
            }
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::local()
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector").finish_non_exhaustive()
    }
}
