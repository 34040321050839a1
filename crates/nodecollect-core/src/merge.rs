//! Reconciling probed values with the live configuration.

use crate::types::ValueSet;

/// Combine probe-derived and live-config-derived values.
///
/// Every key of `live` replaces the probed value; keys present on one side
/// only pass through. Neither input is modified.
#[must_use]
pub fn merge(probed: &ValueSet, live: &ValueSet) -> ValueSet {
    let mut merged = probed.clone();
    for (key, info) in live.iter() {
        merged.insert(key.clone(), info.clone());
    }
    merged
}
