//! Deterministic fixed-width digests for hash keys and hashdiffs.
//!
//! A digest is computed over an ordered tuple of components. Each component
//! is rendered to canonical text (null becomes the empty string) with `\`
//! and `|` escaped, trailing empty components are dropped, and the rest are
//! joined with `|`. The result is hashed with SHA-256 and rendered as
//! lower-case hex, truncated to the requested width. Dropping trailing empty
//! components means that appending an optional component that is null leaves
//! existing keys unchanged.

use crate::staging::Value;
use sha2::{Digest, Sha256};

pub const DEFAULT_DIGEST_WIDTH: usize = 32;
pub const KEY_DELIMITER: char = '|';
const ESCAPE: char = '\\';
/// Hex characters in a full SHA-256 digest.
pub const MAX_DIGEST_WIDTH: usize = 64;

/// Digest of a tuple of already-canonical parts (`None` for null).
pub fn digest<'a, I>(parts: I, width: usize) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut escaped: Vec<String> = parts.into_iter().map(|p| escape(p.unwrap_or_default())).collect();
    while escaped.last().is_some_and(String::is_empty) {
        escaped.pop();
    }
    let mut joined = String::new();
    for (i, part) in escaped.iter().enumerate() {
        if i > 0 {
            joined.push(KEY_DELIMITER);
        }
        joined.push_str(part);
    }

    let mut encoded = hex::encode(Sha256::digest(joined.as_bytes()));
    encoded.truncate(width.min(MAX_DIGEST_WIDTH));
    encoded
}

fn escape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if c == ESCAPE || c == KEY_DELIMITER {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Digest of a tuple of values, rendered through `Value::canonical`.
pub fn digest_values(values: &[Value], width: usize) -> String {
    let canonical: Vec<Option<String>> = values.iter().map(Value::canonical).collect();
    digest(canonical.iter().map(Option::as_deref), width)
}

/// Hash key of a business-key tuple of plain text values.
pub fn hash_key(parts: &[&str]) -> String {
    digest(parts.iter().map(|p| Some(p.trim())), DEFAULT_DIGEST_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_digest_is_stable_and_fixed_width() {
        let a = hash_key(&["C1"]);
        let b = hash_key(&["C1"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, hash_key(&["C2"]));
    }

    #[test]
    fn test_known_vector() {
        // sha256("C1") truncated to 32 hex characters.
        let full = digest([Some("C1")], 64);
        assert_eq!(&full[..32], hash_key(&["C1"]));
        assert_eq!(full.len(), 64);
    }

    #[rstest]
    #[case(&[Value::from("C1"), Value::Null], &[Value::from("C1")])]
    #[case(&[Value::from(" C1 ")], &[Value::from("C1")])]
    fn test_equivalent_tuples(#[case] left: &[Value], #[case] right: &[Value]) {
        assert_eq!(digest_values(left, 32), digest_values(right, 32));
    }

    #[test]
    fn test_component_boundaries_matter() {
        let ab_c = digest_values(&[Value::from("ab"), Value::from("c")], 32);
        let a_bc = digest_values(&[Value::from("a"), Value::from("bc")], 32);
        assert_ne!(ab_c, a_bc);
    }

    #[rstest]
    #[case(&["a|b"], &["a", "b"])]
    #[case(&["a|"], &["a"])]
    #[case(&["a\\", "b"], &["a", "\\b"])]
    fn test_delimiter_inside_component_is_escaped(#[case] left: &[&str], #[case] right: &[&str]) {
        assert_ne!(hash_key(left), hash_key(right));
    }

    #[test]
    fn test_hashdiff_sees_trailing_delimiter_before_nulls() {
        let before = digest_values(&[Value::from("a"), Value::Null, Value::Null], 32);
        let after = digest_values(&[Value::from("a|"), Value::Null, Value::Null], 32);
        assert_ne!(before, after);
        assert_eq!(before, digest_values(&[Value::from("a")], 32));
    }

    #[test]
    fn test_width_is_capped() {
        assert_eq!(digest([Some("x")], 100).len(), 64);
        assert_eq!(digest([Some("x")], 8).len(), 8);
    }
}
