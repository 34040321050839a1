//! node-collector - Kubernetes node compliance data collector
//!
//! Runs the audit commands of a CIS-style spec on the local node and prints
//! the collected values.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    nodecollect_cli::run().await
}
