//! Pagination, document hydration and highlighting of ranked hits.

use std::collections::BTreeMap;

use ahash::AHashMap;
use futures::future::try_join_all;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::field::{FieldSpec, extract_text};
use crate::search::highlight::HighlightConfig;
use crate::search::scorer::DocumentScore;
use crate::store::DocumentStore;

/// Ranked documents produced by one of the query branches.
#[derive(Clone, Debug, Default)]
pub struct SearchHits {
    /// Documents best first.
    pub scores: Vec<DocumentScore>,
    /// Index terms that matched, by document id then field index.
    pub matched_terms: AHashMap<String, Vec<Vec<String>>>,
}

impl SearchHits {
    /// Record that `term` matched `field` of document `id`.
    pub fn record_match(&mut self, id: &str, field: usize, term: &str) {
        let fields = self.matched_terms.entry(id.to_string()).or_default();
        if fields.len() <= field {
            fields.resize_with(field + 1, Vec::new);
        }
        if !fields[field].iter().any(|t| t == term) {
            fields[field].push(term.to_string());
        }
    }
}

/// One result row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchRow {
    /// Document id.
    pub id: String,
    /// Relevance score.
    pub score: f64,
    /// The document, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
    /// Highlighted text by field name, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighting: Option<BTreeMap<String, String>>,
}

/// Response of a search call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    /// Ranked rows.
    Results {
        /// Number of matching documents before pagination.
        total_rows: usize,
        /// The requested page of rows.
        rows: Vec<SearchRow>,
    },
    /// Acknowledgement of a build or destroy request.
    Ack {
        /// Always `true`.
        ok: bool,
    },
}

impl SearchResponse {
    /// The response to a query without results.
    pub fn empty() -> Self {
        SearchResponse::Results {
            total_rows: 0,
            rows: Vec::new(),
        }
    }

    /// The acknowledgement of a build or destroy request.
    pub fn ack() -> Self {
        SearchResponse::Ack { ok: true }
    }

    /// Number of matching documents before pagination; `0` for acknowledgements.
    pub fn total_rows(&self) -> usize {
        match self {
            SearchResponse::Results { total_rows, .. } => *total_rows,
            SearchResponse::Ack { .. } => 0,
        }
    }

    /// Result rows; empty for acknowledgements.
    pub fn rows(&self) -> &[SearchRow] {
        match self {
            SearchResponse::Results { rows, .. } => rows,
            SearchResponse::Ack { .. } => &[],
        }
    }
}

/// Turns ranked hits into a response page.
#[derive(Debug)]
pub struct ResultProcessor<'a> {
    store: &'a dyn DocumentStore,
    fields: &'a [FieldSpec],
    skip: usize,
    limit: Option<usize>,
    include_docs: bool,
    highlight: Option<HighlightConfig>,
}

impl<'a> ResultProcessor<'a> {
    /// Create a processor returning every hit without documents.
    pub fn new(store: &'a dyn DocumentStore, fields: &'a [FieldSpec]) -> Self {
        ResultProcessor {
            store,
            fields,
            skip: 0,
            limit: None,
            include_docs: false,
            highlight: None,
        }
    }

    /// Set the page window.
    pub fn paginate(mut self, skip: Option<usize>, limit: Option<usize>) -> Self {
        self.skip = skip.unwrap_or(0);
        self.limit = limit;
        self
    }

    /// Attach documents to rows.
    pub fn include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    /// Highlight matched terms with `config`.
    pub fn highlight(mut self, config: Option<HighlightConfig>) -> Self {
        self.highlight = config;
        self
    }

    /// Build the response for `hits`.
    pub async fn process(&self, hits: SearchHits) -> Result<SearchResponse> {
        let total_rows = hits.scores.len();
        let page: Vec<DocumentScore> = hits
            .scores
            .into_iter()
            .skip(self.skip)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();
        debug!("returning {} of {total_rows} rows", page.len());

        let docs = if self.include_docs || self.highlight.is_some() {
            Some(try_join_all(page.iter().map(|hit| self.store.get(&hit.id))).await?)
        } else {
            None
        };

        let rows = page
            .into_iter()
            .enumerate()
            .map(|(position, hit)| {
                let doc = docs.as_ref().map(|docs| &docs[position]);
                let highlighting = match (&self.highlight, doc) {
                    (Some(config), Some(doc)) => Some(self.highlight_doc(
                        config,
                        doc,
                        hits.matched_terms.get(&hit.id),
                    )?),
                    _ => None,
                };
                Ok(SearchRow {
                    doc: if self.include_docs { doc.cloned() } else { None },
                    id: hit.id,
                    score: hit.score,
                    highlighting,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchResponse::Results { total_rows, rows })
    }

    fn highlight_doc(
        &self,
        config: &HighlightConfig,
        doc: &Value,
        matched: Option<&Vec<Vec<String>>>,
    ) -> Result<BTreeMap<String, String>> {
        let mut highlighting = BTreeMap::new();
        let Some(matched) = matched else {
            return Ok(highlighting);
        };

        for (field, terms) in self.fields.iter().zip(matched) {
            if terms.is_empty() {
                continue;
            }
            if let Some(text) = extract_text(field, doc) {
                highlighting.insert(field.name.clone(), config.highlight(&text, terms.as_slice())?);
            }
        }
        Ok(highlighting)
    }
}
