//! Assets compiled into the binary.

use nodecollect_core::{AssetProvider, CollectorError, Result, SpecSource};

const PARAMETER_DEFAULTS: &str = include_str!("../assets/config.yaml");
const KUBELET_MAPPING: &str = include_str!("../assets/kubelet-mapping.yaml");
const VERSION_MAPPING: &str = include_str!("../assets/version-mapping.yaml");

/// `(platform, file, text)` of every bundled spec
const SPECS: &[(&str, &str, &str)] = &[
    ("aks", "aks-cis-1.0.yaml", include_str!("../assets/specs/aks/aks-cis-1.0.yaml")),
    ("eks", "eks-cis-1.2.yaml", include_str!("../assets/specs/eks/eks-cis-1.2.yaml")),
    ("gke", "gke-cis-1.2.yaml", include_str!("../assets/specs/gke/gke-cis-1.2.yaml")),
    ("k8s", "cis-1.23.yaml", include_str!("../assets/specs/k8s/cis-1.23.yaml")),
    ("rke2", "rke2-cis-1.24.yaml", include_str!("../assets/specs/rke2/rke2-cis-1.24.yaml")),
];

/// Spec files and configuration documents shipped with the collector
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl EmbeddedAssets {
    /// Platforms that have bundled specs
    pub fn platforms() -> impl Iterator<Item = &'static str> {
        let mut names: Vec<&str> = SPECS.iter().map(|(p, _, _)| *p).collect();
        names.dedup();
        names.into_iter()
    }
}

impl AssetProvider for EmbeddedAssets {
    fn spec_sources(&self, platform: &str) -> Result<Vec<SpecSource>> {
        let sources: Vec<SpecSource> = SPECS
            .iter()
            .filter(|(p, _, _)| *p == platform)
            .map(|(_, file, text)| SpecSource::new(*file, *text))
            .collect();

        if sources.is_empty() {
            return Err(CollectorError::CatalogLoad {
                platform: platform.to_string(),
                reason: format!(
                    "no bundled specs; known platforms: {}",
                    Self::platforms().collect::<Vec<_>>().join(", ")
                ),
            });
        }
        Ok(sources)
    }

    fn parameter_defaults(&self) -> Result<String> {
        Ok(PARAMETER_DEFAULTS.to_string())
    }

    fn kubelet_mapping(&self) -> Result<String> {
        Ok(KUBELET_MAPPING.to_string())
    }

    fn version_mapping(&self) -> Result<String> {
        Ok(VERSION_MAPPING.to_string())
    }
}
