//! Cluster version normalization.
//!
//! Distributions decorate the upstream version with build suffixes
//! (`v1.23.17-eks-8ccc7ba`, `v1.23.11+rke2r1`). Spec selection only cares
//! about `major.minor`.

use crate::error::{CollectorError, Result};
use crate::types::PlatformVersion;

/// Parse the leading `major.minor` pair of a version string.
///
/// Leading non-digits are skipped; everything after the minor component
/// (patch, pre-release, vendor build) is ignored.
pub fn parse_major_minor(raw: &str) -> Result<(u64, u64)> {
    let malformed = || CollectorError::MalformedVersion(raw.to_string());

    let rest = raw.trim_start_matches(|c: char| !c.is_ascii_digit());
    let (major, rest) = take_number(rest).ok_or_else(malformed)?;
    let rest = rest.strip_prefix('.').ok_or_else(malformed)?;
    let (minor, _) = take_number(rest).ok_or_else(malformed)?;

    Ok((major, minor))
}

/// Reduce a version string to `"<major>.<minor>"`
pub fn normalize_version(raw: &str) -> Result<String> {
    let (major, minor) = parse_major_minor(raw)?;
    Ok(format!("{major}.{minor}"))
}

/// Build the run's platform identity from the caller's platform name and
/// the raw cluster version.
pub fn resolve_platform(name: &str, raw_version: &str) -> Result<PlatformVersion> {
    Ok(PlatformVersion {
        name: name.to_string(),
        version: normalize_version(raw_version)?,
    })
}

/// Split a leading run of ASCII digits off `s`
fn take_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_versions() {
        let cases = [
            ("v1.23.2", "1.23"),
            ("v1.23.17-eks-8ccc7ba", "1.23"),
            ("v1.23.10-gke.2300", "1.23"),
            ("v1.23.11+rke2r1", "1.23"),
            ("v1.23.15+c763d11", "1.23"),
            ("1.27", "1.27"),
            ("v1.9+", "1.9"),
            ("v1.28.3-k3s1", "1.28"),
        ];
        for (raw, want) in cases {
            assert_eq!(normalize_version(raw).unwrap(), want, "{raw}");
        }
    }

    #[test]
    fn test_malformed_versions() {
        for raw in ["", "v", "v1", "v1.", "latest", "1-23"] {
            let err = normalize_version(raw).unwrap_err();
            assert!(
                matches!(err, CollectorError::MalformedVersion(ref s) if s == raw),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn test_parse_major_minor() {
        assert_eq!(parse_major_minor("v1.23.2").unwrap(), (1, 23));
        assert_eq!(parse_major_minor("4.12").unwrap(), (4, 12));
    }

    #[test]
    fn test_resolve_platform() {
        let p = resolve_platform("eks", "v1.23.17-eks-8ccc7ba").unwrap();
        assert_eq!(p.name, "eks");
        assert_eq!(p.version, "1.23");
    }
}
