//! Spec assets and the per-platform spec catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CollectorError, Result};
use crate::types::{ParameterMap, SpecDocument, SpecKey};

/// File name of the parameter-defaults document
pub const PARAMETER_DEFAULTS_FILE: &str = "config.yaml";
/// File name of the kubelet key-mapping document
pub const KUBELET_MAPPING_FILE: &str = "kubelet-mapping.yaml";
/// File name of the version-mapping document
pub const VERSION_MAPPING_FILE: &str = "version-mapping.yaml";
/// Directory holding one sub-directory of spec files per platform
pub const SPECS_DIR: &str = "specs";

/// Raw text of one spec file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSource {
    /// File name, used for ordering and error messages
    pub name: String,
    /// YAML text
    pub text: String,
}

impl SpecSource {
    /// Create a source from its file name and text
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Supplies spec files and configuration documents to the engine
pub trait AssetProvider: Send + Sync {
    /// All spec files bundled for `platform`.
    ///
    /// Fails with [`CollectorError::CatalogLoad`] when the platform has no
    /// spec directory.
    fn spec_sources(&self, platform: &str) -> Result<Vec<SpecSource>>;

    /// Parameter-defaults YAML
    fn parameter_defaults(&self) -> Result<String>;

    /// Kubelet key-mapping YAML
    fn kubelet_mapping(&self) -> Result<String>;

    /// Version-mapping YAML
    fn version_mapping(&self) -> Result<String>;
}

impl<T: AssetProvider + ?Sized> AssetProvider for Arc<T> {
    fn spec_sources(&self, platform: &str) -> Result<Vec<SpecSource>> {
        (**self).spec_sources(platform)
    }

    fn parameter_defaults(&self) -> Result<String> {
        (**self).parameter_defaults()
    }

    fn kubelet_mapping(&self) -> Result<String> {
        (**self).kubelet_mapping()
    }

    fn version_mapping(&self) -> Result<String> {
        (**self).version_mapping()
    }
}

/// Assets held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    specs: BTreeMap<String, BTreeMap<String, String>>,
    parameter_defaults: Option<String>,
    kubelet_mapping: Option<String>,
    version_mapping: Option<String>,
}

impl MemoryAssets {
    /// Create an empty asset set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec file for `platform`
    #[must_use]
    pub fn with_spec(
        mut self,
        platform: impl Into<String>,
        file: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.specs
            .entry(platform.into())
            .or_default()
            .insert(file.into(), text.into());
        self
    }

    /// Set the parameter-defaults document
    #[must_use]
    pub fn with_parameter_defaults(mut self, text: impl Into<String>) -> Self {
        self.parameter_defaults = Some(text.into());
        self
    }

    /// Set the kubelet key-mapping document
    #[must_use]
    pub fn with_kubelet_mapping(mut self, text: impl Into<String>) -> Self {
        self.kubelet_mapping = Some(text.into());
        self
    }

    /// Set the version-mapping document
    #[must_use]
    pub fn with_version_mapping(mut self, text: impl Into<String>) -> Self {
        self.version_mapping = Some(text.into());
        self
    }
}

fn missing(document: &str) -> CollectorError {
    CollectorError::Config(format!("no {document} document available"))
}

impl AssetProvider for MemoryAssets {
    fn spec_sources(&self, platform: &str) -> Result<Vec<SpecSource>> {
        let files = self
            .specs
            .get(platform)
            .ok_or_else(|| CollectorError::CatalogLoad {
                platform: platform.to_string(),
                reason: "no spec directory".into(),
            })?;
        Ok(files
            .iter()
            .map(|(name, text)| SpecSource::new(name.clone(), text.clone()))
            .collect())
    }

    fn parameter_defaults(&self) -> Result<String> {
        self.parameter_defaults
            .clone()
            .ok_or_else(|| missing("parameter defaults"))
    }

    fn kubelet_mapping(&self) -> Result<String> {
        self.kubelet_mapping
            .clone()
            .ok_or_else(|| missing("kubelet mapping"))
    }

    fn version_mapping(&self) -> Result<String> {
        self.version_mapping
            .clone()
            .ok_or_else(|| missing("version mapping"))
    }
}

/// Assets read from a directory laid out as
/// `config.yaml`, `kubelet-mapping.yaml`, `version-mapping.yaml` and
/// `specs/<platform>/*.yaml`.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    /// Use `root` as the asset directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file: &str) -> Result<String> {
        let path = self.root.join(file);
        std::fs::read_to_string(&path).map_err(|e| CollectorError::io(path.display().to_string(), e))
    }
}

impl AssetProvider for DirAssets {
    fn spec_sources(&self, platform: &str) -> Result<Vec<SpecSource>> {
        let dir = self.root.join(SPECS_DIR).join(platform);
        if !dir.is_dir() {
            return Err(CollectorError::CatalogLoad {
                platform: platform.to_string(),
                reason: format!("{} is not a directory", dir.display()),
            });
        }

        let mut sources = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| CollectorError::CatalogLoad {
                platform: platform.to_string(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            if !entry.file_type().is_file() || !is_yaml {
                debug!(path = %path.display(), "skipping non-spec file");
                continue;
            }
            let text = std::fs::read_to_string(path)
                .map_err(|e| CollectorError::io(path.display().to_string(), e))?;
            sources.push(SpecSource::new(
                entry.file_name().to_string_lossy().into_owned(),
                text,
            ));
        }
        Ok(sources)
    }

    fn parameter_defaults(&self) -> Result<String> {
        self.read(PARAMETER_DEFAULTS_FILE)
    }

    fn kubelet_mapping(&self) -> Result<String> {
        self.read(KUBELET_MAPPING_FILE)
    }

    fn version_mapping(&self) -> Result<String> {
        self.read(VERSION_MAPPING_FILE)
    }
}

/// Replaces selected configuration documents of another provider
pub struct AssetOverrides<A> {
    base: A,
    parameter_defaults: Option<String>,
    kubelet_mapping: Option<String>,
    version_mapping: Option<String>,
}

impl<A: AssetProvider> AssetOverrides<A> {
    /// Wrap `base` without any override
    pub const fn new(base: A) -> Self {
        Self {
            base,
            parameter_defaults: None,
            kubelet_mapping: None,
            version_mapping: None,
        }
    }

    /// Override the parameter-defaults document
    #[must_use]
    pub fn parameter_defaults(mut self, text: Option<String>) -> Self {
        self.parameter_defaults = text;
        self
    }

    /// Override the kubelet key-mapping document
    #[must_use]
    pub fn kubelet_mapping(mut self, text: Option<String>) -> Self {
        self.kubelet_mapping = text;
        self
    }

    /// Override the version-mapping document
    #[must_use]
    pub fn version_mapping(mut self, text: Option<String>) -> Self {
        self.version_mapping = text;
        self
    }
}

impl<A: AssetProvider> AssetProvider for AssetOverrides<A> {
    fn spec_sources(&self, platform: &str) -> Result<Vec<SpecSource>> {
        self.base.spec_sources(platform)
    }

    fn parameter_defaults(&self) -> Result<String> {
        match &self.parameter_defaults {
            Some(text) => Ok(text.clone()),
            None => self.base.parameter_defaults(),
        }
    }

    fn kubelet_mapping(&self) -> Result<String> {
        match &self.kubelet_mapping {
            Some(text) => Ok(text.clone()),
            None => self.base.kubelet_mapping(),
        }
    }

    fn version_mapping(&self) -> Result<String> {
        match &self.version_mapping {
            Some(text) => Ok(text.clone()),
            None => self.base.version_mapping(),
        }
    }
}

/// Parse one spec file and substitute parameters into its audit commands
pub fn parse_spec(source: &SpecSource, params: &ParameterMap) -> Result<SpecDocument> {
    let parse_error = |reason: String| CollectorError::SpecParse {
        source_name: source.name.clone(),
        reason,
    };

    let mut doc: SpecDocument =
        serde_yaml::from_str(&source.text).map_err(|e| parse_error(e.to_string()))?;

    if doc.name.trim().is_empty() || doc.version.trim().is_empty() {
        return Err(parse_error("spec name and version are required".into()));
    }
    if let Some(entry) = doc.collectors.iter().find(|c| c.key.trim().is_empty()) {
        return Err(parse_error(format!(
            "collector {:?} has an empty key",
            entry.title
        )));
    }

    for entry in &mut doc.collectors {
        entry.audit = params.substitute(&entry.audit);
    }
    Ok(doc)
}

/// Spec documents of one platform keyed by `(name, version)`
#[derive(Debug, Clone, Default)]
pub struct SpecCatalog {
    specs: BTreeMap<SpecKey, SpecDocument>,
}

impl SpecCatalog {
    /// Load and parse every spec of `platform`.
    ///
    /// Files are processed in lexicographic name order; a later file with
    /// the same `(name, version)` replaces an earlier one.
    pub fn load(
        assets: &dyn AssetProvider,
        platform: &str,
        params: &ParameterMap,
    ) -> Result<Self> {
        let mut sources = assets.spec_sources(platform)?;
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        let mut catalog = Self::default();
        for source in &sources {
            let doc = parse_spec(source, params)?;
            debug!(file = %source.name, spec = %doc.key(), "loaded spec");
            catalog.insert(doc, &source.name);
        }
        Ok(catalog)
    }

    fn insert(&mut self, doc: SpecDocument, file: &str) {
        let key = doc.key();
        if self.specs.insert(key.clone(), doc).is_some() {
            warn!(spec = %key, file, "duplicate spec replaced by later file");
        }
    }

    /// Document stored under `key`
    #[must_use]
    pub fn get(&self, key: &SpecKey) -> Option<&SpecDocument> {
        self.specs.get(key)
    }

    /// All keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &SpecKey> {
        self.specs.keys()
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the catalog holds no documents
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<SpecDocument> for SpecCatalog {
    fn from_iter<I: IntoIterator<Item = SpecDocument>>(iter: I) -> Self {
        let mut catalog = Self::default();
        for doc in iter {
            catalog.insert(doc, "<memory>");
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, EntryRole, FactKind};

    const SPEC_A: &str = r#"---
version: "1.23"
name: k8s-cis
title: Node Specification for info collector
collectors:
  - key: kubeletConfFileOwnership
    title: kubelet config file ownership
    audit: stat -c %U:%G $kubelet.confs
    nodeType: worker
  - key: etcdDataDirectoryPermissions
    title: etcd data directory permissions
    audit: stat -c %a ${etcd.datadirs}
    nodeType: master
  - key: flannelConf
    title: flannel config
    audit: cat $flanneld.confs
"#;

    const SPEC_A_OVERRIDE: &str = r#"
version: "1.23"
name: k8s-cis
title: replaced
collectors: []
"#;

    fn params() -> ParameterMap {
        let mut map = ParameterMap::new();
        map.insert(Component::Kubelet, FactKind::Config, "/var/lib/kubelet/config.yaml");
        map.insert(Component::Etcd, FactKind::DataDir, "/var/lib/etcd");
        map
    }

    #[test]
    fn test_parse_and_substitute() {
        let doc = parse_spec(&SpecSource::new("a.yaml", SPEC_A), &params()).unwrap();
        assert_eq!(doc.key(), SpecKey::new("k8s-cis", "1.23"));
        assert_eq!(doc.collectors.len(), 3);
        assert_eq!(
            doc.collectors[0].audit,
            "stat -c %U:%G /var/lib/kubelet/config.yaml"
        );
        assert_eq!(doc.collectors[0].node_type, EntryRole::Any);
        assert_eq!(doc.collectors[1].audit, "stat -c %a /var/lib/etcd");
        assert_eq!(doc.collectors[1].node_type, EntryRole::Master);
        // no flanneld parameter resolved
        assert_eq!(doc.collectors[2].audit, "cat $flanneld.confs");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_spec(&SpecSource::new("broken.yaml", "collectors: 7"), &params()).unwrap_err();
        match err {
            CollectorError::SpecParse { source_name, .. } => assert_eq!(source_name, "broken.yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_requires_name_and_version() {
        let err = parse_spec(
            &SpecSource::new("x.yaml", "name: k8s-cis\nversion: ''\n"),
            &params(),
        )
        .unwrap_err();
        assert!(matches!(err, CollectorError::SpecParse { .. }));
    }

    #[test]
    fn test_missing_platform_is_catalog_error() {
        let assets = MemoryAssets::new().with_spec("k8s", "a.yaml", SPEC_A);
        let err = SpecCatalog::load(&assets, "eks", &params()).unwrap_err();
        assert!(matches!(err, CollectorError::CatalogLoad { ref platform, .. } if platform == "eks"));
    }

    #[test]
    fn test_last_file_wins() {
        let assets = MemoryAssets::new()
            .with_spec("k8s", "b-override.yaml", SPEC_A_OVERRIDE)
            .with_spec("k8s", "a.yaml", SPEC_A);
        let catalog = SpecCatalog::load(&assets, "k8s", &params()).unwrap();
        assert_eq!(catalog.len(), 1);
        let doc = catalog.get(&SpecKey::new("k8s-cis", "1.23")).unwrap();
        assert_eq!(doc.title, "replaced");
    }

    #[test]
    fn test_dir_assets() {
        let dir = tempfile::tempdir().unwrap();
        let specs = dir.path().join(SPECS_DIR).join("k8s");
        std::fs::create_dir_all(&specs).unwrap();
        std::fs::write(specs.join("k8s-cis-1.23.yaml"), SPEC_A).unwrap();
        std::fs::write(specs.join("README.md"), "not a spec").unwrap();
        std::fs::write(dir.path().join(KUBELET_MAPPING_FILE), "a: kubeletconfig.a\n").unwrap();

        let assets = DirAssets::new(dir.path());
        let sources = assets.spec_sources("k8s").unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "k8s-cis-1.23.yaml");
        assert_eq!(assets.kubelet_mapping().unwrap(), "a: kubeletconfig.a\n");
        assert!(matches!(
            assets.parameter_defaults(),
            Err(CollectorError::Io { .. })
        ));
        assert!(matches!(
            assets.spec_sources("gke"),
            Err(CollectorError::CatalogLoad { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let base = MemoryAssets::new()
            .with_kubelet_mapping("base")
            .with_version_mapping("base");
        let assets = AssetOverrides::new(base).kubelet_mapping(Some("override".into()));
        assert_eq!(AssetProvider::kubelet_mapping(&assets).unwrap(), "override");
        assert_eq!(AssetProvider::version_mapping(&assets).unwrap(), "base");
        assert!(matches!(
            AssetProvider::parameter_defaults(&assets),
            Err(CollectorError::Config(_))
        ));
    }
}
