//! Version endpoint.

use crate::KubeClient;
use nodecollect_core::{Result, ServerVersion};

/// `/version` endpoint
pub struct VersionApi<'a> {
    client: &'a KubeClient,
}

impl<'a> VersionApi<'a> {
    pub(crate) const fn new(client: &'a KubeClient) -> Self {
        Self { client }
    }

    /// Build information of the API server
    pub async fn get(&self) -> Result<ServerVersion> {
        let body = self.client.get_json(&["version"]).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Raw `gitVersion` string, e.g. `v1.23.17-eks-8ccc7ba`
    pub async fn git_version(&self) -> Result<String> {
        Ok(self.get().await?.git_version)
    }
}
