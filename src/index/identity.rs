//! Stable naming of persisted search views.
//!
//! The name depends only on the set of indexed field names and the language
//! configuration: field order and boosts do not change it, so every search
//! over the same fields reuses the same persisted view.

use serde_json::json;

use crate::field::FieldSpec;

/// Prefix of every persisted search view name.
pub const INDEX_NAME_PREFIX: &str = "search-";

/// Name of the persisted view for `fields` analyzed with `languages`.
pub fn index_name(fields: &[FieldSpec], languages: &[String]) -> String {
    let mut names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    names.sort_unstable();

    let language = match languages {
        [single] => json!(single),
        many => json!(many),
    };
    // serde_json maps keep keys sorted, so this serialization is canonical.
    let params = json!({ "fields": names, "language": language });

    format!(
        "{INDEX_NAME_PREFIX}{:08x}",
        crc32fast::hash(params.to_string().as_bytes())
    )
}
