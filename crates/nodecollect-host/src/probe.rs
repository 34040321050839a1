//! Discovery of host-specific parameters for spec templates.
//!
//! Each component fact is looked up through an ordered candidate list with
//! a configured default:
//!
//! ```text
//! candidates empty          -> fact omitted
//! probe error (any)         -> default, remaining candidates skipped
//! probe output empty        -> next candidate
//! nothing matched           -> default
//! ```
//!
//! A probe failure never aborts the run.

use std::future::Future;
use std::path::Path;

use futures_util::future::join_all;
use nodecollect_core::{
    CollectorError, Component, ComponentParams, FactKind, NodeParams, ParameterMap, Result, Shell,
};
use tracing::{debug, warn};

/// Shell pipeline printing the executable of the first running process
/// named `name`
#[must_use]
pub fn binary_probe_command(name: &str) -> String {
    format!("ps -e -o args= 2>/dev/null | awk '{{print $1}}' | grep -E '(^|/){name}$' | head -n 1")
}

/// Shell pipeline printing the first path matching `pattern`
#[must_use]
pub fn file_probe_command(pattern: &str) -> String {
    format!("ls -d {pattern} 2>/dev/null | head -n 1")
}

/// Resolve one fact from ordered candidates.
///
/// `probe` is called with each candidate in turn until one yields
/// non-empty output.
pub async fn resolve<F, Fut>(candidates: &[String], default: &str, mut probe: F) -> String
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    if candidates.is_empty() {
        return String::new();
    }

    for candidate in candidates {
        match probe(candidate.clone()).await {
            Ok(output) => {
                let output = output.trim();
                if !output.is_empty() {
                    debug!(candidate = %candidate, resolved = output, "candidate matched");
                    return output.to_string();
                }
            }
            Err(e) => {
                let failure = CollectorError::ProbeFailure(e.to_string());
                warn!(candidate = %candidate, error = %failure, default, "falling back to default");
                return default.to_string();
            }
        }
    }
    default.to_string()
}

/// Base name of the first running binary among `candidates`
pub async fn lookup_binary(shell: &dyn Shell, candidates: &[String], default: &str) -> String {
    resolve(candidates, default, |name| async move {
        let found = shell.execute(&binary_probe_command(&name)).await?;
        Ok(base_name(&found))
    })
    .await
}

/// First existing path among the glob `candidates`
pub async fn lookup_file(shell: &dyn Shell, candidates: &[String], default: &str) -> String {
    resolve(candidates, default, |pattern| async move {
        shell.execute(&file_probe_command(&pattern)).await
    })
    .await
}

/// Directory containing the first existing path among `candidates`
pub async fn lookup_folder(shell: &dyn Shell, candidates: &[String], default: &str) -> String {
    let path = lookup_file(shell, candidates, default).await;
    parent_dir(&path)
}

/// Resolve every fact of one component
pub async fn probe_component(
    shell: &dyn Shell,
    component: Component,
    params: &ComponentParams,
) -> ParameterMap {
    let mut map = ParameterMap::new();
    for kind in FactKind::ALL {
        let (candidates, default) = params.lookup(kind);
        let value = match kind {
            FactKind::Binary => lookup_binary(shell, candidates, default).await,
            k if k.is_folder() => lookup_folder(shell, candidates, default).await,
            _ => lookup_file(shell, candidates, default).await,
        };
        map.insert(component, kind, &value);
    }
    debug!(component = %component, resolved = map.len(), "component probed");
    map
}

/// Probe all components concurrently and return the frozen parameter map
pub async fn probe_parameters(shell: &dyn Shell, params: &NodeParams) -> ParameterMap {
    let probes = Component::ALL
        .into_iter()
        .map(|component| probe_component(shell, component, params.component(component)));

    let mut merged = ParameterMap::new();
    for map in join_all(probes).await {
        merged.extend(map);
    }
    merged
}

fn base_name(path: &str) -> String {
    let path = path.trim();
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
}

fn parent_dir(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    Path::new(path)
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
