//! The index map function.
//!
//! [`IndexMapper`] is handed to the host store, which runs it over every
//! document whenever the persisted search view needs refreshing. For one
//! document it emits a posting per analyzed term per field and a single
//! document info row with the field length norms.

use std::fmt;
use std::sync::Arc;

use log::trace;
use serde_json::Value;

use crate::analysis::{TermAnalyzer, TokenizeMode};
use crate::error::MapSearchError;
use crate::field::{FieldSpec, extract_text};
use crate::index::{docinfo_key, posting_key};
use crate::store::{Emitter, MapFunction};

/// Document-level predicate deciding whether a document is indexed.
pub type DocumentFilter = Arc<dyn Fn(&Value) -> anyhow::Result<bool> + Send + Sync>;

/// Map function emitting the search index rows of a document.
#[derive(Clone)]
pub struct IndexMapper {
    fields: Arc<[FieldSpec]>,
    analyzer: Arc<TermAnalyzer>,
    filter: Option<DocumentFilter>,
}

impl IndexMapper {
    /// Create a mapper over `fields` analyzed with `analyzer`.
    pub fn new(fields: Vec<FieldSpec>, analyzer: Arc<TermAnalyzer>) -> Self {
        IndexMapper {
            fields: fields.into(),
            analyzer,
            filter: None,
        }
    }

    /// Only index documents accepted by `filter`.
    pub fn with_filter(mut self, filter: Option<DocumentFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Get the indexed fields.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn accepts(&self, id: &str, doc: &Value, emitter: &mut dyn Emitter) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        match filter(doc) {
            Ok(accepted) => accepted,
            Err(e) => {
                emitter.report_error(MapSearchError::filter(format!("document '{id}': {e}")));
                false
            }
        }
    }
}

impl MapFunction for IndexMapper {
    fn map(&self, doc: &Value, emitter: &mut dyn Emitter) {
        let Some(id) = doc.get("_id").and_then(Value::as_str) else {
            emitter.report_error(MapSearchError::other("document without a string '_id'"));
            return;
        };
        if !self.accepts(id, doc, emitter) {
            trace!("document '{id}' filtered out");
            return;
        }

        let multi_field = self.fields.len() > 1;
        let mut rows = Vec::new();
        let mut norms = Vec::with_capacity(self.fields.len());

        for (field_index, field) in self.fields.iter().enumerate() {
            let Some(text) = extract_text(field, doc) else {
                norms.push(0.0);
                continue;
            };
            let terms = match self.analyzer.tokenize(&text, TokenizeMode::Index) {
                Ok(terms) => terms,
                Err(e) => {
                    emitter.report_error(e);
                    return;
                }
            };

            let value = if multi_field {
                Value::from(field_index)
            } else {
                Value::Null
            };
            norms.push((terms.len() as f64).sqrt());
            rows.extend(terms.iter().map(|term| (posting_key(term), value.clone())));
        }

        trace!("document '{id}' emits {} postings", rows.len());
        for (key, value) in rows {
            emitter.emit(key, value);
        }
        emitter.emit(docinfo_key(id), Value::from(norms));
    }
}

impl fmt::Debug for IndexMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexMapper")
            .field("fields", &self.fields)
            .field("pipeline", &self.analyzer.pipeline().name())
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
