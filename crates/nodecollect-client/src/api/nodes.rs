//! Node endpoints.

use crate::KubeClient;
use nodecollect_core::{LiveConfigDocument, Result};

/// `/api/v1/nodes` endpoints
pub struct NodesApi<'a> {
    client: &'a KubeClient,
}

impl<'a> NodesApi<'a> {
    pub(crate) const fn new(client: &'a KubeClient) -> Self {
        Self { client }
    }

    /// Running kubelet configuration of `node`, read through the API
    /// server's node proxy
    pub async fn configz(&self, node: &str) -> Result<LiveConfigDocument> {
        let body = self
            .client
            .get_json(&["api", "v1", "nodes", node, "proxy", "configz"])
            .await?;
        Ok(LiveConfigDocument::from(body))
    }
}
