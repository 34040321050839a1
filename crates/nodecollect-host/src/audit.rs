//! Audit execution on the host.

use nodecollect_core::{CollectorError, Info, NodeRole, Result, Shell, SpecDocument, ValueSet};
use tracing::{debug, info};

/// Run every audit of `spec` that applies to `role`, in document order.
///
/// The first failing command aborts the whole run; a partial value set is
/// never returned.
pub async fn run_audits(shell: &dyn Shell, spec: &SpecDocument, role: NodeRole) -> Result<ValueSet> {
    let mut values = ValueSet::new();
    let mut skipped = 0_usize;

    for entry in &spec.collectors {
        if !entry.node_type.applies_to(role) {
            skipped += 1;
            continue;
        }

        let output = shell
            .execute(&entry.audit)
            .await
            .map_err(|e| CollectorError::AuditCommand {
                key: entry.key.clone(),
                reason: e.to_string(),
            })?;

        debug!(key = %entry.key, output = %output, "audit collected");
        values.insert(entry.key.clone(), Info::from_output(output.trim()));
    }

    info!(
        spec = %spec.key(),
        collected = values.len(),
        skipped,
        "audits complete"
    );
    Ok(values)
}
