// ABOUTME: Deterministic fingerprints over an operation's meaningful inputs.
// ABOUTME: SHA-256 over an order-sensitive, separator-joined field list.

use sha2::{Digest, Sha256};

/// Separator between fields; a control character that does not occur in
/// ordinary text, so `["a|b", "c"]` and `["a", "b|c"]` hash differently.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Hash the given fields, in order, into a hex fingerprint.
pub fn fingerprint<S: AsRef<str>>(fields: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            let mut buf = [0u8; 4];
            hasher.update(FIELD_SEPARATOR.encode_utf8(&mut buf).as_bytes());
        }
        hasher.update(field.as_ref().as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint(&["A", "B"]);
        assert_eq!(a, fingerprint(&["A".to_string(), "B".to_string()]));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        assert_ne!(fingerprint(&["A", "B"]), fingerprint(&["B", "A"]));
    }

    #[test]
    fn test_fingerprint_field_boundaries() {
        assert_ne!(fingerprint(&["a|b", "c"]), fingerprint(&["a", "b|c"]));
        assert_ne!(fingerprint(&["ab"]), fingerprint(&["a", "b"]));
    }
}
