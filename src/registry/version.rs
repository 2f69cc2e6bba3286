//! Version resolution over the version keys a registry publishes.
//!
//! All functions are pure. Keys that are not valid semantic versions are
//! dropped before any comparison, so they can never be returned.

use semver::{Version, VersionReq};

/// Parses every well-formed version, keeping the original key alongside.
fn parse_all<'a, I>(versions: I) -> Vec<(Version, &'a str)>
where
    I: IntoIterator<Item = &'a String>,
{
    versions
        .into_iter()
        .filter_map(|raw| Version::parse(raw).ok().map(|v| (v, raw.as_str())))
        .collect()
}

/// Well-formed versions in ascending semantic-version order.
pub fn sort_ascending(versions: &[String]) -> Vec<String> {
    let mut parsed = parse_all(versions);
    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    parsed.into_iter().map(|(_, raw)| raw.to_string()).collect()
}

/// The greatest well-formed version, or `None` when there is none.
pub fn latest(versions: &[String]) -> Option<String> {
    sort_ascending(versions).pop()
}

/// The greatest version compatible with `base` under caret semantics
/// (`^base`: same major, not lower than `base`).
///
/// An unparseable `base` matches nothing.
pub fn latest_compatible(base: &str, versions: &[String]) -> Option<String> {
    let req = VersionReq::parse(&format!("^{}", base)).ok()?;

    parse_all(versions)
        .into_iter()
        .filter(|(v, _)| req.matches(v))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw.to_string())
}

/// Whether `candidate` is strictly newer than `current`. Malformed input is never newer.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    match (Version::parse(candidate), Version::parse(current)) {
        (Ok(c), Ok(cur)) => c > cur,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_latest_picks_semver_max_not_string_max() {
        let versions = v(&["1.9.0", "1.10.0", "1.2.3"]);
        assert_eq!(latest(&versions), Some("1.10.0".to_string()));
    }

    #[test]
    fn test_latest_empty() {
        assert_eq!(latest(&[]), None);
    }

    #[test]
    fn test_latest_ignores_malformed() {
        let versions = v(&["not-a-version", "9999", "v3.0.0", "1.0.0"]);
        assert_eq!(latest(&versions), Some("1.0.0".to_string()));

        let only_bad = v(&["latest", "", "1.0"]);
        assert_eq!(latest(&only_bad), None);
    }

    #[test]
    fn test_latest_orders_prerelease_below_release() {
        let versions = v(&["2.0.0-beta.1", "2.0.0", "2.0.0-rc.1"]);
        assert_eq!(latest(&versions), Some("2.0.0".to_string()));
    }

    #[test]
    fn test_sort_ascending() {
        let versions = v(&["1.10.0", "bogus", "1.2.0", "0.9.1"]);
        assert_eq!(sort_ascending(&versions), v(&["0.9.1", "1.2.0", "1.10.0"]));
    }

    #[test]
    fn test_latest_compatible_same_major_newest() {
        let versions = v(&["1.2.1", "1.3.0", "2.0.0"]);
        assert_eq!(
            latest_compatible("1.2.0", &versions),
            Some("1.3.0".to_string())
        );
    }

    #[test]
    fn test_latest_compatible_none_when_only_older() {
        let versions = v(&["1.1.0"]);
        assert_eq!(latest_compatible("1.2.0", &versions), None);
    }

    #[test]
    fn test_latest_compatible_includes_base_itself() {
        let versions = v(&["1.2.0", "0.9.0"]);
        assert_eq!(
            latest_compatible("1.2.0", &versions),
            Some("1.2.0".to_string())
        );
    }

    #[test]
    fn test_latest_compatible_bad_base_matches_nothing() {
        let versions = v(&["1.2.0"]);
        assert_eq!(latest_compatible("not.a.version", &versions), None);
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("1.3.0", "1.2.0"));
        assert!(!is_newer("1.2.0", "1.2.0"));
        assert!(!is_newer("garbage", "1.2.0"));
    }
}
