//! `node-collector collect` - Collect compliance data from this node.

use anyhow::{Context as _, Result};
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use nodecollect::{
    AssetOverrides, AssetProvider, ClusterConfig, CollectRequest, Collector, CollectorError,
    DirAssets, EmbeddedAssets, HostShell, KubeClient, LiveConfigDocument, LiveConfigSource,
    NoLiveConfig, NodeRecord, SpecRequest, StaticLiveConfig, DEFAULT_TIMEOUT,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::Context;
use crate::cli::args::CollectArgs;
use crate::output::write_records;

pub async fn execute(ctx: Context, args: CollectArgs) -> Result<()> {
    let timeout = args
        .timeout
        .or(ctx.config.timeout_secs)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

    // API setup and the version lookup count against the same deadline as
    // the collection itself
    let records = tokio::time::timeout(timeout, collect(&ctx, &args, timeout))
        .await
        .map_err(|_| CollectorError::DeadlineExceeded(timeout.as_secs()))??;
    info!(records = records.len(), "collection finished");

    let stdout = std::io::stdout();
    write_records(&mut stdout.lock(), &records, ctx.output_format)
}

async fn collect(ctx: &Context, args: &CollectArgs, timeout: Duration) -> Result<Vec<NodeRecord>> {
    let client = api_client(ctx, args, timeout).await?;

    let cluster_version = match (&args.cluster_version, &client) {
        (Some(version), _) => version.clone(),
        (None, Some(client)) => client
            .version()
            .git_version()
            .await
            .context("Could not read the cluster version from the API server")?,
        (None, None) => anyhow::bail!(
            "Cluster version unknown.\n\n\
             Pass it with --cluster-version <VERSION>, or run inside a cluster\n\
             or with --server so it can be read from the API server."
        ),
    };

    let live = live_source(args, client)?;
    let assets = asset_provider(ctx, args)?;

    let request = CollectRequest {
        platform: args.platform.clone(),
        cluster_version,
        spec: SpecRequest {
            name: args.spec_name.clone(),
            version: args.spec_version.clone(),
        },
        node_name: args.node.clone().filter(|n| !n.trim().is_empty()),
        timeout,
    };

    let collector = Collector::new(HostShell::new(), live, assets);
    Ok(collector.run(&request).await?)
}

/// API client from flags, the config file or the in-cluster environment
async fn api_client(
    ctx: &Context,
    args: &CollectArgs,
    timeout: Duration,
) -> Result<Option<KubeClient>> {
    let insecure = args.insecure || ctx.config.insecure;

    let cluster = match args.server.clone().or_else(|| ctx.config.server.clone()) {
        Some(server) => Some(ClusterConfig::new(server).with_insecure(insecure)),
        None => ClusterConfig::in_cluster()
            .await?
            .map(|c| c.with_insecure(insecure)),
    };

    let Some(mut cluster) = cluster else {
        debug!("no API server configured");
        return Ok(None);
    };
    if let Some(token) = &args.token {
        cluster = cluster.with_token(token.clone());
    }
    cluster = cluster.with_timeout(timeout);

    debug!(server = %cluster.server, "using API server");
    Ok(Some(KubeClient::from_config(cluster)?))
}

/// Where the live kubelet configuration comes from
fn live_source(args: &CollectArgs, client: Option<KubeClient>) -> Result<Box<dyn LiveConfigSource>> {
    if let Some(encoded) = &args.kubelet_config {
        let raw = decode(encoded).context("--kubelet-config")?;
        let doc = LiveConfigDocument::from_slice(&raw).context("--kubelet-config is not valid JSON")?;
        return Ok(Box::new(StaticLiveConfig::new(doc)));
    }

    match client {
        Some(client) if args.node.is_some() => Ok(Box::new(client)),
        _ => Ok(Box::new(NoLiveConfig)),
    }
}

/// Bundled or on-disk assets with base64 document overrides applied
fn asset_provider(ctx: &Context, args: &CollectArgs) -> Result<AssetOverrides<Arc<dyn AssetProvider>>> {
    let dir: Option<PathBuf> = match &args.assets_dir {
        Some(dir) => Some(dir.clone()),
        None => ctx.config.assets_path()?,
    };

    let base: Arc<dyn AssetProvider> = match dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "reading assets from directory");
            Arc::new(DirAssets::new(dir))
        }
        None => Arc::new(EmbeddedAssets),
    };

    Ok(AssetOverrides::new(base)
        .parameter_defaults(decode_text(args.node_config.as_deref(), "--node-config")?)
        .version_mapping(decode_text(
            args.spec_version_mapping.as_deref(),
            "--spec-version-mapping",
        )?)
        .kubelet_mapping(decode_text(
            args.kubelet_config_mapping.as_deref(),
            "--kubelet-config-mapping",
        )?))
}

fn decode(encoded: &str) -> Result<Vec<u8>> {
    B64.decode(encoded.trim())
        .map_err(|e| anyhow::anyhow!("invalid base64: {e}"))
}

fn decode_text(encoded: Option<&str>, flag: &str) -> Result<Option<String>> {
    encoded
        .map(|value| {
            let raw = decode(value).context(flag.to_string())?;
            String::from_utf8(raw).with_context(|| format!("{flag} is not UTF-8 text"))
        })
        .transpose()
}
