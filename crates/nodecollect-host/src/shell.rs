//! Shell execution on the local host.

use std::process::Stdio;

use async_trait::async_trait;
use nodecollect_core::{CollectorError, Result, Shell};
use tokio::process::Command;
use tracing::debug;

/// Default interpreter used for audit and probe commands
pub const DEFAULT_SHELL: &str = "sh";

/// Runs commands with `sh -c` on the local host.
///
/// Child processes are killed if the calling future is dropped, so a run
/// cancelled by its deadline does not leave probes behind.
#[derive(Debug, Clone)]
pub struct HostShell {
    program: String,
}

impl HostShell {
    /// Use the default `sh` interpreter
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_SHELL)
    }

    /// Use another interpreter that accepts `-c <command>`
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for HostShell {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Shell for HostShell {
    async fn execute(&self, command: &str) -> Result<String> {
        debug!(command, "executing");

        let output = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CollectorError::Shell {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CollectorError::Shell {
                command: command.to_string(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
