//! Inverted index derived through the host's map/reduce views.
//!
//! Two kinds of rows live in a search view:
//!
//! - term postings, keyed `TOKEN_PREFIX + term`, one per emitted term, whose
//!   value is the field index (or `null` when only one field is indexed);
//! - document info, keyed `DOCINFO_PREFIX + id`, whose value lists the length
//!   norm of every configured field.

pub mod identity;
pub mod mapper;

pub use identity::index_name;
pub use mapper::{DocumentFilter, IndexMapper};

use serde_json::Value;

/// Key prefix of term postings.
pub const TOKEN_PREFIX: &str = "a";

/// Key prefix of document info rows.
pub const DOCINFO_PREFIX: &str = "b";

/// Upper bound appended to a key prefix for range scans.
///
/// Keys compare by UTF-8 bytes, so only the largest scalar value sorts after
/// every continuation of the prefix.
pub const HIGH_KEY_SUFFIX: char = char::MAX;

/// Inclusive key range holding every posting whose term starts with `prefix`.
pub fn posting_range(prefix: &str) -> (String, String) {
    let start = posting_key(prefix);
    let end = format!("{start}{HIGH_KEY_SUFFIX}");
    (start, end)
}

/// Row key of the posting for `term`.
pub fn posting_key(term: &str) -> String {
    format!("{TOKEN_PREFIX}{term}")
}

/// Row key of the document info row for `id`.
pub fn docinfo_key(id: &str) -> String {
    format!("{DOCINFO_PREFIX}{id}")
}

/// Term of a posting key, `None` for other rows.
pub fn term_of(key: &str) -> Option<&str> {
    key.strip_prefix(TOKEN_PREFIX)
}

/// Field index stored in a posting value.
pub fn field_index(value: &Value) -> usize {
    value.as_u64().map(|v| v as usize).unwrap_or(0)
}

/// Field norms stored in a document info value.
pub fn field_norms(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .map(|norms| norms.iter().map(|n| n.as_f64().unwrap_or(0.0)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(posting_key("fox"), "afox");
        assert_eq!(docinfo_key("doc-1"), "bdoc-1");
        assert_eq!(term_of("afox"), Some("fox"));
        assert_eq!(term_of("bdoc-1"), None);
    }

    #[test]
    fn test_posting_range_covers_every_continuation() {
        let (start, end) = posting_range("fox");

        for term in ["fox", "foxes", "fox\u{ffff}", "fox\u{1d4b3}", "fox\u{10fff0}"] {
            let key = posting_key(term);
            assert!(start <= key && key <= end, "{term:?}");
        }
        assert!(posting_key("foy") > end);
        assert!(posting_key("fo") < start);
    }

    #[test]
    fn test_values() {
        assert_eq!(field_index(&Value::Null), 0);
        assert_eq!(field_index(&json!(2)), 2);
        assert_eq!(field_norms(&json!([1.0, 0, 2.5])), vec![1.0, 0.0, 2.5]);
        assert!(field_norms(&Value::Null).is_empty());
    }
}
