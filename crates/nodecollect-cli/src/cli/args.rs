//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Kubernetes node compliance data collector
///
/// Probes the node for component files and processes, runs the audit
/// commands of a CIS-style spec and prints what it found.
#[derive(Parser, Debug)]
#[command(name = "node-collector")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect compliance data from this node
    Collect(CollectArgs),

    /// List platforms with bundled specs
    Platforms,

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Collect command
// ============================================================================

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Platform target (k8s, eks, gke, aks, rke2)
    #[arg(default_value = "k8s")]
    pub platform: String,

    /// Spec name, e.g. k8s-cis
    #[arg(short = 's', long)]
    pub spec_name: Option<String>,

    /// Spec version, e.g. 1.23
    #[arg(long)]
    pub spec_version: Option<String>,

    /// Cluster version, e.g. v1.23.17; read from the API server when omitted
    #[arg(short = 'c', long)]
    pub cluster_version: Option<String>,

    /// Name of this node
    #[arg(short = 'n', long, env = "NODE_NAME")]
    pub node: Option<String>,

    /// Deadline for the whole run, in seconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Kubelet configuration (configz JSON) encoded in base64, used
    /// instead of the API server
    #[arg(long)]
    pub kubelet_config: Option<String>,

    /// Parameter defaults document (YAML) encoded in base64
    #[arg(long)]
    pub node_config: Option<String>,

    /// Version mapping document (YAML) encoded in base64
    #[arg(long)]
    pub spec_version_mapping: Option<String>,

    /// Kubelet key mapping document (YAML) encoded in base64
    #[arg(long)]
    pub kubelet_config_mapping: Option<String>,

    /// Read spec assets from this directory instead of the bundled ones
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    /// API server URL; defaults to the in-cluster service
    #[arg(long, env = "NODE_COLLECTOR_SERVER")]
    pub server: Option<String>,

    /// Bearer token for the API server
    #[arg(long, env = "NODE_COLLECTOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Skip TLS verification of the API server
    #[arg(long)]
    pub insecure: bool,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., output_format, timeout_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}
