//! Kubernetes node compliance data collector.
//!
//! Probes the local node for component binaries, configuration files and
//! data directories, runs the audit commands of a CIS-style spec, overlays
//! the kubelet's live configuration when the API server is reachable and
//! emits a [`NodeRecord`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nodecollect::{CollectRequest, Collector, KubeClient};
//!
//! #[tokio::main]
//! async fn main() -> nodecollect::Result<()> {
//!     let client = KubeClient::builder("https://10.96.0.1").token("...").build()?;
//!     let version = client.version().git_version().await?;
//!
//!     let collector = Collector::local().with_live_config(client);
//!     let request = CollectRequest::new("k8s", version).node_name("worker-1");
//!
//!     for record in collector.run(&request).await? {
//!         println!("{}", serde_json::to_string_pretty(&record)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/nodecollect/0.1.0")]

mod assets;
mod collector;

pub use assets::EmbeddedAssets;
pub use collector::{CollectRequest, Collector, DEFAULT_TIMEOUT};

// Re-export core types
pub use nodecollect_core::*;

// Re-export client
pub use nodecollect_client::{ClusterConfig, KubeClient, KubeClientBuilder};

// Re-export host integrations
pub use nodecollect_host as host;
pub use nodecollect_host::HostShell;

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
