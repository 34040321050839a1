//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Default run timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// API server URL used when not running inside a cluster.
    pub server: Option<String>,

    /// Directory holding spec assets instead of the bundled ones.
    pub assets_dir: Option<String>,

    /// Skip TLS verification of the API server.
    #[serde(default)]
    pub insecure: bool,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "nodecollect", "node-collector")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Assets directory with `~` and environment variables expanded.
    pub fn assets_path(&self) -> Result<Option<PathBuf>> {
        self.assets_dir
            .as_deref()
            .map(|dir| {
                shellexpand::full(dir)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .map_err(|e| anyhow::anyhow!("Invalid assets_dir {dir:?}: {e}"))
            })
            .transpose()
    }

    /// Set a key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "timeout_secs" | "timeout" => self.timeout_secs = Some(value.parse()?),
            "server" => self.server = Some(value.to_string()),
            "assets_dir" => self.assets_dir = Some(value.to_string()),
            "insecure" => self.insecure = value.parse()?,
            _ => anyhow::bail!(
                "Unknown config key: {}\n\n\
                 Available keys:\n  \
                 output_format    - json, yaml or table\n  \
                 timeout_secs     - Run timeout in seconds\n  \
                 server           - API server URL\n  \
                 assets_dir       - Spec assets directory\n  \
                 insecure         - Skip TLS verification (true/false)",
                key
            ),
        }
        Ok(())
    }
}
