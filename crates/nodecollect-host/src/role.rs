//! Node role detection.

use nodecollect_core::{NodeRole, Result, Shell};
use tracing::debug;

use crate::probe::binary_probe_command;

/// API server binaries looked for when the defaults document lists none
pub const DEFAULT_APISERVER_BINARIES: [&str; 4] =
    ["kube-apiserver", "hyperkube", "apiserver", "openshift"];

/// A node running an API server process is a master; anything else is a
/// worker.
///
/// Unlike parameter probing, a failing shell is reported.
pub async fn detect_role(shell: &dyn Shell, apiserver_binaries: &[String]) -> Result<NodeRole> {
    let defaults: Vec<String>;
    let candidates = if apiserver_binaries.is_empty() {
        defaults = DEFAULT_APISERVER_BINARIES.iter().map(ToString::to_string).collect();
        &defaults
    } else {
        apiserver_binaries
    };

    for binary in candidates {
        let found = shell.execute(&binary_probe_command(binary)).await?;
        if !found.trim().is_empty() {
            debug!(binary = %binary, process = found.trim(), "api server running");
            return Ok(NodeRole::Master);
        }
    }
    Ok(NodeRole::Worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nodecollect_core::CollectorError;

    struct Processes(Vec<&'static str>);

    #[async_trait]
    impl Shell for Processes {
        async fn execute(&self, command: &str) -> Result<String> {
            Ok(self
                .0
                .iter()
                .find(|p| command == binary_probe_command(p))
                .map(ToString::to_string)
                .unwrap_or_default())
        }
    }

    struct Broken;

    #[async_trait]
    impl Shell for Broken {
        async fn execute(&self, command: &str) -> Result<String> {
            Err(CollectorError::Shell {
                command: command.to_string(),
                reason: "no ps".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_master_when_apiserver_runs() {
        let shell = Processes(vec!["kube-apiserver"]);
        assert_eq!(detect_role(&shell, &[]).await.unwrap(), NodeRole::Master);
    }

    #[tokio::test]
    async fn test_worker_otherwise() {
        let shell = Processes(vec!["kubelet"]);
        assert_eq!(detect_role(&shell, &[]).await.unwrap(), NodeRole::Worker);
    }

    #[tokio::test]
    async fn test_configured_candidates_replace_defaults() {
        let shell = Processes(vec!["kube-apiserver"]);
        let role = detect_role(&shell, &["k3s-server".to_string()]).await.unwrap();
        assert_eq!(role, NodeRole::Worker);
    }

    #[tokio::test]
    async fn test_shell_failure_is_reported() {
        assert!(detect_role(&Broken, &[]).await.is_err());
    }
}
