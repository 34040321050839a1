//! Host and cluster capabilities the engine depends on.

use async_trait::async_trait;

use crate::error::{CollectorError, Result};
use crate::types::LiveConfigDocument;

/// Runs shell one-liners on the host
#[async_trait]
pub trait Shell: Send + Sync {
    /// Run `command` and return its stdout with surrounding whitespace
    /// trimmed. A non-zero exit is an error.
    async fn execute(&self, command: &str) -> Result<String>;
}

/// Fetches a node's live configuration from the control plane
#[async_trait]
pub trait LiveConfigSource: Send + Sync {
    /// Live configuration of `node_name`
    async fn fetch(&self, node_name: &str) -> Result<LiveConfigDocument>;
}

#[async_trait]
impl<T: LiveConfigSource + ?Sized> LiveConfigSource for Box<T> {
    async fn fetch(&self, node_name: &str) -> Result<LiveConfigDocument> {
        (**self).fetch(node_name).await
    }
}

/// A live configuration supplied up front, e.g. on the command line
#[derive(Debug, Clone)]
pub struct StaticLiveConfig(LiveConfigDocument);

impl StaticLiveConfig {
    /// Serve `doc` for every node
    #[must_use]
    pub const fn new(doc: LiveConfigDocument) -> Self {
        Self(doc)
    }
}

#[async_trait]
impl LiveConfigSource for StaticLiveConfig {
    async fn fetch(&self, _node_name: &str) -> Result<LiveConfigDocument> {
        Ok(self.0.clone())
    }
}

/// No control plane access; every fetch reports the configuration as
/// unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLiveConfig;

#[async_trait]
impl LiveConfigSource for NoLiveConfig {
    async fn fetch(&self, node_name: &str) -> Result<LiveConfigDocument> {
        Err(CollectorError::LiveConfigUnavailable(format!(
            "no API access configured for node {node_name:?}"
        )))
    }
}
