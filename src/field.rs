//! Field specifications and text extraction.
//!
//! A [`FieldSpec`] says where the text of one indexed field comes from and
//! how strongly matches in it count. The source is resolved once, when the
//! spec is built, into one of three shapes: a top-level property, a dotted
//! path into nested objects and arrays, or a caller supplied extractor.
//!
//! # Examples
//!
//! ```
//! use mapsearch::field::{FieldSpec, extract_text};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "_id": "1",
//!     "title": "Hello",
//!     "authors": [{"name": "Ann"}, {"name": "Bob"}],
//! });
//!
//! assert_eq!(extract_text(&FieldSpec::new("title", 1.0), &doc).as_deref(), Some("Hello"));
//! assert_eq!(
//!     extract_text(&FieldSpec::new("authors.name", 1.0), &doc).as_deref(),
//!     Some("Ann Bob")
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Caller supplied text extractor for a field.
pub type TextExtractor = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Boost applied to fields configured without one.
pub const DEFAULT_BOOST: f64 = 1.0;

/// Where the text of a field comes from.
#[derive(Clone)]
pub enum FieldSource {
    /// A top-level document property.
    Simple(String),
    /// A path of property names walked from the document root.
    DeepPath(Vec<String>),
    /// A custom extractor function.
    Custom(TextExtractor),
}

impl fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Simple(name) => f.debug_tuple("Simple").field(name).finish(),
            FieldSource::DeepPath(path) => f.debug_tuple("DeepPath").field(path).finish(),
            FieldSource::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// One indexed field.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    /// Field name as configured; part of the index identity.
    pub name: String,
    /// Resolved text source.
    pub source: FieldSource,
    /// Multiplier applied to this field's score contributions.
    pub boost: f64,
}

impl FieldSpec {
    /// Create a field spec, treating a dotted name as a nested path.
    pub fn new<S: Into<String>>(name: S, boost: f64) -> Self {
        let name = name.into();
        let source = if name.contains('.') {
            FieldSource::DeepPath(name.split('.').map(str::to_string).collect())
        } else {
            FieldSource::Simple(name.clone())
        };
        FieldSpec {
            name,
            source,
            boost,
        }
    }

    /// Create a field spec whose text comes from a custom extractor.
    pub fn with_extractor<S: Into<String>>(name: S, extractor: TextExtractor, boost: f64) -> Self {
        FieldSpec {
            name: name.into(),
            source: FieldSource::Custom(extractor),
            boost,
        }
    }
}

/// Extract the text to index for `spec` from `doc`.
///
/// Missing, `null`, `false`, zero and empty values all come back as `None`.
pub fn extract_text(spec: &FieldSpec, doc: &Value) -> Option<String> {
    let text = match &spec.source {
        FieldSource::Custom(extractor) => extractor(doc),
        FieldSource::Simple(name) => doc.get(name).and_then(to_text),
        FieldSource::DeepPath(path) => resolve_path(doc, path).and_then(|v| to_text(&v)),
    };
    text.filter(|t| !t.is_empty())
}

/// Walk `path` from `value`. Arrays met along the way map every element
/// through the rest of the path.
fn resolve_path(value: &Value, path: &[String]) -> Option<Value> {
    let Some((segment, rest)) = path.split_first() else {
        return (!value.is_null()).then(|| value.clone());
    };

    match value {
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| resolve_path(item, path).as_ref().and_then(to_text))
                .map(Value::String)
                .collect(),
        )),
        Value::Object(map) => resolve_path(map.get(segment)?, rest),
        _ => None,
    }
}

/// String form of a resolved value, `None` for falsy values.
fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) => {
            let joined = items.iter().map(element_text).collect::<Vec<_>>().join(" ");
            (!joined.is_empty()).then_some(joined)
        }
        other => Some(element_text(other)),
    }
}

fn element_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(element_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
