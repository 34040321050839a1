//! Cluster connection settings.

use nodecollect_core::{CollectorError, Result};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the in-cluster API server host
pub const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";

/// Environment variable holding the in-cluster API server port
pub const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// Mount point of the pod's service account credentials
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Connection settings for the API server
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    /// API server URL
    pub server: String,

    /// Bearer token
    pub token: Option<String>,

    /// PEM encoded CA bundle
    pub root_ca: Option<Vec<u8>>,

    /// Skip TLS verification
    pub insecure: bool,

    /// Per-request limit; the client default when unset
    pub timeout: Option<Duration>,
}

impl ClusterConfig {
    /// Settings for an explicitly given server
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Toggle TLS verification
    #[must_use]
    pub const fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Cap every request at `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Settings of the pod this process runs in, or `None` outside a
    /// cluster
    pub async fn in_cluster() -> Result<Option<Self>> {
        let host = std::env::var(SERVICE_HOST_ENV).ok();
        let port = std::env::var(SERVICE_PORT_ENV).ok();
        match (host, port) {
            (Some(host), Some(port)) => {
                Self::from_service_account(&host, &port, Path::new(SERVICE_ACCOUNT_DIR))
                    .await
                    .map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Build settings from a service host, port and credentials directory
    pub async fn from_service_account(host: &str, port: &str, dir: &Path) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(CollectorError::Config(format!("{SERVICE_HOST_ENV} is empty")));
        }
        // IPv6 service addresses need brackets
        let server = if host.contains(':') {
            format!("https://[{host}]:{}", port.trim())
        } else {
            format!("https://{host}:{}", port.trim())
        };

        let token_path = dir.join("token");
        let token = tokio::fs::read_to_string(&token_path)
            .await
            .map_err(|e| CollectorError::io(token_path.display().to_string(), e))?;

        let ca_path = dir.join("ca.crt");
        let root_ca = match tokio::fs::read(&ca_path).await {
            Ok(pem) => Some(pem),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(CollectorError::io(ca_path.display().to_string(), e)),
        };

        Ok(Self {
            server,
            token: Some(token.trim().to_string()),
            root_ca,
            insecure: false,
            timeout: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_service_account() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("token"), "abc.def\n").unwrap();
        std::fs::write(dir.path().join("ca.crt"), "PEM").unwrap();

        let config = ClusterConfig::from_service_account("10.96.0.1", "443", dir.path())
            .await
            .unwrap();
        assert_eq!(config.server, "https://10.96.0.1:443");
        assert_eq!(config.token.as_deref(), Some("abc.def"));
        assert_eq!(config.root_ca.as_deref(), Some(b"PEM".as_slice()));
        assert!(!config.insecure);
    }

    #[test]
    fn test_ipv6_host_and_missing_ca() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("token"), "t").unwrap();

        let config = tokio_test::block_on(ClusterConfig::from_service_account(
            "fd00::1",
            "6443",
            dir.path(),
        ))
        .unwrap();
        assert_eq!(config.server, "https://[fd00::1]:6443");
        assert!(config.root_ca.is_none());
    }

    #[tokio::test]
    async fn test_missing_token_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClusterConfig::from_service_account("10.0.0.1", "443", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CollectorError::Io { .. }));
    }

    #[test]
    fn test_explicit_server() {
        let config = ClusterConfig::new("https://api:6443")
            .with_token("t")
            .with_insecure(true)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.server, "https://api:6443");
        assert!(config.insecure);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
