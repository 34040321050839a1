//! Kubernetes API client implementation.

use crate::api::{NodesApi, VersionApi};
use crate::config::ClusterConfig;
use async_trait::async_trait;
use nodecollect_core::{CollectorError, LiveConfigDocument, LiveConfigSource, Result};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the handful of API server endpoints the collector reads
#[derive(Clone)]
pub struct KubeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl KubeClient {
    /// Create a builder for the API server at `base_url`
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> KubeClientBuilder {
        KubeClientBuilder::new(base_url)
    }

    /// Build a client from resolved cluster settings
    pub fn from_config(config: ClusterConfig) -> Result<Self> {
        let mut builder = Self::builder(config.server).accept_invalid_certs(config.insecure);
        if let Some(token) = config.token {
            builder = builder.token(token);
        }
        if let Some(pem) = config.root_ca {
            builder = builder.root_certificate(pem);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Access the version endpoint
    #[must_use]
    pub fn version(&self) -> VersionApi<'_> {
        VersionApi::new(self)
    }

    /// Access node endpoints
    #[must_use]
    pub fn nodes(&self) -> NodesApi<'_> {
        NodesApi::new(self)
    }

    /// API server the client talks to
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET the resource at `segments` below the base URL and decode the
    /// JSON body
    pub(crate) async fn get_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET request");

        let mut request = self.inner.http.get(url);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        self.handle_response(response).await
    }

    /// Base URL extended by `segments`, each percent-encoded as a single
    /// path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CollectorError::Config(format!(
                    "API server URL {} cannot carry a path",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, e: &reqwest::Error) -> CollectorError {
        if e.is_timeout() {
            CollectorError::Timeout(self.inner.timeout.as_secs())
        } else {
            CollectorError::Http(e.to_string())
        }
    }

    /// Handle an API response that returns JSON
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| self.transport_error(&e))?;
            serde_json::from_slice(&body).map_err(CollectorError::Json)
        } else {
            Self::handle_error(status.as_u16(), response).await
        }
    }

    /// Convert an error response into a [`CollectorError`]
    async fn handle_error<T>(status: u16, response: reqwest::Response) -> Result<T> {
        let body = response.text().await.unwrap_or_default();

        // API server errors are `Status` objects with a `message` field
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or(body);

        match status {
            401 | 403 => {
                warn!(status, message = %message, "API server refused credentials");
                Err(CollectorError::Unauthorized)
            }
            404 => Err(CollectorError::NotFound { resource: message }),
            _ => Err(CollectorError::Api {
                code: status,
                message,
            }),
        }
    }
}

#[async_trait]
impl LiveConfigSource for KubeClient {
    async fn fetch(&self, node_name: &str) -> Result<LiveConfigDocument> {
        if node_name.trim().is_empty() {
            return Err(CollectorError::LiveConfigUnavailable(
                "node name unknown".to_string(),
            ));
        }
        self.nodes()
            .configz(node_name)
            .await
            .map_err(|e| CollectorError::LiveConfigUnavailable(format!("node {node_name}: {e}")))
    }
}

/// Builder for configuring a [`KubeClient`]
pub struct KubeClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: String,
    accept_invalid_certs: bool,
    root_certificate: Option<Vec<u8>>,
}

impl KubeClientBuilder {
    /// Create a new builder for the API server at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("node-collector/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
            root_certificate: None,
        }
    }

    /// Send `token` as a bearer credential
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Skip TLS certificate verification
    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Trust an additional PEM encoded CA certificate
    #[must_use]
    pub fn root_certificate(mut self, pem: Vec<u8>) -> Self {
        self.root_certificate = Some(pem);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<KubeClient> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| CollectorError::Config(format!("invalid API server URL {base:?}: {e}")))?;

        let mut http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(pem) = &self.root_certificate {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| CollectorError::Config(format!("invalid CA certificate: {e}")))?;
            http = http.add_root_certificate(cert);
        }

        let http = http
            .build()
            .map_err(|e| CollectorError::Http(e.to_string()))?;

        Ok(KubeClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                token: self.token,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> KubeClient {
        KubeClient::builder(server.uri()).token("s3cr3t").build().unwrap()
    }

    #[tokio::test]
    async fn test_bearer_token_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .and(header("authorization", "Bearer s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "major": "1",
                "minor": "27",
                "gitVersion": "v1.27.3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.get_json(&["version"]).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "kind": "Status",
                "message": "nodes \"ghost\" not found"
            })))
            .mount(&server)
            .await;
        Mock::given(path("/broken"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.get_json(&["forbidden"]).await,
            Err(CollectorError::Unauthorized)
        ));
        match client.get_json(&["missing"]).await {
            Err(CollectorError::NotFound { resource }) => {
                assert_eq!(resource, "nodes \"ghost\" not found");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match client.get_json(&["broken"]).await {
            Err(CollectorError::Api { code, message }) => {
                assert_eq!(code, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v1/nodes/node-1/proxy/configz"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch("node-1").await.unwrap_err();
        assert!(matches!(err, CollectorError::LiveConfigUnavailable(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(matches!(
            KubeClient::builder("not a url").build(),
            Err(CollectorError::Config(_))
        ));
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let client = KubeClient::builder("https://proxy.example/k8s").build().unwrap();
        assert_eq!(client.endpoint(&["version"]).unwrap().as_str(), "https://proxy.example/k8s/version");
    }

    #[test]
    fn test_config_timeout_caps_requests() {
        let config = ClusterConfig::new("https://10.96.0.1").with_timeout(Duration::from_secs(3));
        let client = KubeClient::from_config(config).unwrap();
        assert_eq!(client.inner.timeout, Duration::from_secs(3));

        let default = KubeClient::from_config(ClusterConfig::new("https://10.96.0.1")).unwrap();
        assert_eq!(default.inner.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = KubeClient::builder("https://10.96.0.1").build().unwrap();
        let url = client
            .endpoint(&["api", "v1", "nodes", "node a/b", "proxy", "configz"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.96.0.1/api/v1/nodes/node%20a%2Fb/proxy/configz"
        );
    }
}
