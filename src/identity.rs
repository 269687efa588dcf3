//! Device identity normalization
//!
//! The hub enumerates composite devices (a control unit with several relays,
//! a sensor with several measurement endpoints) as sibling ids sharing a
//! prefix: `<uuid>_1`, `<uuid>_2`, ... Only the `_1` endpoint (or an id
//! without suffix) carries the canonical name and room.

/// Suffix marking the primary endpoint of a composite device
pub const PRIMARY_SUFFIX: &str = "1";

/// Map a raw device id to its logical identity.
///
/// Returns the id truncated at its last `_` together with a flag telling
/// whether the raw id is the primary endpoint.
///
/// ```
/// use dirigera_metrics::normalize;
///
/// assert_eq!(normalize("abc_1"), ("abc", true));
/// assert_eq!(normalize("abc_2"), ("abc", false));
/// assert_eq!(normalize("abc"), ("abc", true));
/// ```
pub fn normalize(raw_id: &str) -> (&str, bool) {
    match raw_id.rsplit_once('_') {
        None => (raw_id, true),
        Some((prefix, suffix)) => (prefix, suffix == PRIMARY_SUFFIX),
    }
}

/// Id of the primary endpoint sharing `logical_id`.
pub fn primary_id(logical_id: &str) -> String {
    format!("{}_{}", logical_id, PRIMARY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsuffixed_is_primary() {
        assert_eq!(normalize("d6c5e2b0-0000-4a1b"), ("d6c5e2b0-0000-4a1b", true));
    }

    #[test]
    fn test_primary_suffix() {
        assert_eq!(normalize("abc_1"), ("abc", true));
    }

    #[test]
    fn test_sibling_endpoints_share_identity() {
        let (primary, is_primary) = normalize("abc_1");
        for raw in ["abc_2", "abc_3", "abc_12", "abc_x"] {
            let (logical, flag) = normalize(raw);
            assert_eq!(logical, primary, "{}", raw);
            assert!(!flag, "{}", raw);
        }
        assert!(is_primary);
    }

    #[test]
    fn test_splits_on_last_separator() {
        assert_eq!(normalize("a_b_1"), ("a_b", true));
        assert_eq!(normalize("a_b_2"), ("a_b", false));
        assert_eq!(normalize("a_1_2"), ("a_1", false));
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(normalize(""), ("", true));
        assert_eq!(normalize("abc_"), ("abc", false));
        assert_eq!(normalize("_1"), ("", true));
    }

    #[test]
    fn test_primary_id() {
        assert_eq!(primary_id("abc"), "abc_1");
        assert_eq!(normalize(&primary_id("abc")), ("abc", true));
    }
}
