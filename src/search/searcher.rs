//! Query planning and execution.
//!
//! A search tokenizes the query, picks the wildcard or the scored branch,
//! reads the persisted index through the host store and hands the ranked
//! hits to the [`ResultProcessor`].

use std::collections::HashSet;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, trace};

use crate::analysis::{LanguagePipelines, PipelineRegistry, TokenizeMode};
use crate::error::{MapSearchError, Result};
use crate::field::FieldSpec;
use crate::index::{
    IndexMapper, docinfo_key, field_index, field_norms, index_name, posting_key, posting_range,
    term_of,
};
use crate::search::options::SearchOptions;
use crate::search::result_processor::{ResultProcessor, SearchHits, SearchResponse};
use crate::search::scorer::{DocumentScore, score};
use crate::search::stats::TermStatistics;
use crate::search::wildcard::WildcardPattern;
use crate::store::{DocumentStore, MapFunction, QueryOptions, Stale, ViewRow};

/// Runs searches against a host document store.
#[derive(Clone, Debug)]
pub struct Searcher {
    store: Arc<dyn DocumentStore>,
    registry: Arc<PipelineRegistry>,
}

/// Everything one search call needs to talk to its index.
struct IndexHandle {
    map_fn: Arc<dyn MapFunction>,
    base: QueryOptions,
}

impl IndexHandle {
    fn options(&self) -> QueryOptions {
        self.base.clone()
    }

    /// Options of a read followed by more reads in the same search.
    ///
    /// `update_after` is deferred to the last read so that every read of a
    /// search sees the same index state.
    fn leading_read(&self) -> QueryOptions {
        match self.base.stale {
            Some(Stale::UpdateAfter) => self.options().with_stale(Some(Stale::Ok)),
            _ => self.options(),
        }
    }
}

impl Searcher {
    /// Create a searcher using the process-wide pipeline registry.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_registry(store, PipelineRegistry::global())
    }

    /// Create a searcher using a dedicated pipeline registry.
    pub fn with_registry(store: Arc<dyn DocumentStore>, registry: Arc<PipelineRegistry>) -> Self {
        Searcher { store, registry }
    }

    /// Get the host store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Get the pipeline registry.
    pub fn registry(&self) -> &Arc<PipelineRegistry> {
        &self.registry
    }

    /// Run one search, build or destroy request.
    pub async fn search(&self, options: SearchOptions) -> Result<SearchResponse> {
        let fields = options.to_field_specs()?;
        let pipelines = self.registry.pipelines(&options.language)?;
        let index = self.open_index(&fields, &pipelines, &options);

        if options.destroy {
            debug!("destroying index '{}'", index.base.save_as.as_deref().unwrap_or_default());
            let destroy = QueryOptions {
                destroy: true,
                ..index.options()
            };
            self.store.query(Arc::clone(&index.map_fn), destroy).await?;
            return Ok(SearchResponse::ack());
        }
        if options.build {
            debug!("building index '{}'", index.base.save_as.as_deref().unwrap_or_default());
            let build = index.options().with_stale(None).with_limit(0);
            self.store.query(Arc::clone(&index.map_fn), build).await?;
            return Ok(SearchResponse::ack());
        }

        let query = options
            .query
            .as_deref()
            .ok_or_else(|| MapSearchError::query("a query is required"))?;
        let mm = options.minimum_should_match()?;

        let terms = query_terms(
            pipelines
                .search_pipeline
                .tokenize(query, TokenizeMode::Query)?,
        );
        if terms.is_empty() {
            debug!("query '{query}' has no terms");
            return Ok(SearchResponse::empty());
        }

        let hits = match terms.iter().find_map(|t| WildcardPattern::parse(t)) {
            Some(pattern) => self.wildcard_hits(&index, &pattern).await?,
            None => self.scored_hits(&index, &terms, &fields, mm).await?,
        };

        ResultProcessor::new(self.store.as_ref(), &fields)
            .paginate(options.skip, options.limit)
            .include_docs(options.include_docs)
            .highlight(options.highlighting.then(|| options.highlight_config()))
            .process(hits)
            .await
    }

    fn open_index(
        &self,
        fields: &[FieldSpec],
        pipelines: &LanguagePipelines,
        options: &SearchOptions,
    ) -> IndexHandle {
        let mapper = IndexMapper::new(fields.to_vec(), Arc::clone(&pipelines.index_pipeline))
            .with_filter(options.filter.clone());
        IndexHandle {
            map_fn: Arc::new(mapper),
            base: QueryOptions::saved_as(index_name(fields, &options.language))
                .with_stale(options.stale),
        }
    }

    async fn wildcard_hits(
        &self,
        index: &IndexHandle,
        pattern: &WildcardPattern,
    ) -> Result<SearchHits> {
        let (start, end) = posting_range(pattern.literal_prefix());
        debug!("wildcard '{}' scanning [{start}, {end}]", pattern.pattern());

        let response = self
            .store
            .query(Arc::clone(&index.map_fn), index.options().with_range(start, end))
            .await?;

        let mut hits = SearchHits::default();
        let mut seen = HashSet::new();
        for row in &response.rows {
            let Some(term) = term_of(&row.key) else {
                continue;
            };
            if !pattern.matches(term) {
                continue;
            }
            trace!("wildcard '{}' matched '{term}' in '{}'", pattern.pattern(), row.id);
            if seen.insert(row.id.clone()) {
                hits.scores.push(DocumentScore::new(row.id.as_str(), 1.0));
            }
            hits.record_match(&row.id, field_index(&row.value), term);
        }
        Ok(hits)
    }

    async fn scored_hits(
        &self,
        index: &IndexHandle,
        terms: &[String],
        fields: &[FieldSpec],
        mm: f64,
    ) -> Result<SearchHits> {
        let prefix_term = terms.iter().max().map(String::as_str).unwrap_or_default();
        let (start, end) = posting_range(prefix_term);
        debug!("scored query {terms:?}, prefix scan on '{prefix_term}'");

        let prefix_rows = self
            .store
            .query(Arc::clone(&index.map_fn), index.leading_read().with_range(start, end))
            .await?
            .rows;
        let exact_rows = self
            .store
            .query(
                Arc::clone(&index.map_fn),
                index.leading_read().with_keys(terms.iter().map(|t| posting_key(t)).collect()),
            )
            .await?
            .rows;
        let postings = union_postings(exact_rows, prefix_rows);

        let mut stats = TermStatistics::from_postings(&postings);
        stats.apply_minimum_should_match(terms, prefix_term, mm);
        if stats.is_empty() {
            debug!("no documents left after minimum should match");
            return Ok(SearchHits::default());
        }
        debug!("scoring {} candidate documents", stats.len());

        let docinfo = QueryOptions {
            raw_keys: true,
            ..index.options().with_keys(stats.doc_ids().map(docinfo_key).collect())
        };
        let norms: AHashMap<String, Vec<f64>> = self
            .store
            .query(Arc::clone(&index.map_fn), docinfo)
            .await?
            .rows
            .into_iter()
            .map(|row| (row.id, field_norms(&row.value)))
            .collect();

        let boosts: Vec<f64> = fields.iter().map(|f| f.boost).collect();
        let mut hits = SearchHits {
            scores: score(terms, &stats.term_dfs, &stats.docs, &norms, &boosts),
            matched_terms: AHashMap::new(),
        };
        // Prefix variants are highlighted through the prefix term.
        for (id, field_counts) in &stats.docs {
            for (field, counts) in field_counts.iter().enumerate() {
                for term in terms.iter().filter(|t| counts.contains_key(t.as_str())) {
                    hits.record_match(id, field, term);
                }
                if counts.keys().any(|k| !terms.contains(k)) {
                    hits.record_match(id, field, prefix_term);
                }
            }
        }
        Ok(hits)
    }
}

/// Deduplicate query terms, keeping first-seen order.
fn query_terms(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// Exact rows followed by the prefix rows that are not exact rows.
fn union_postings(exact: Vec<ViewRow>, prefix: Vec<ViewRow>) -> Vec<ViewRow> {
    let identity = |row: &ViewRow| (row.key.clone(), row.id.clone(), row.value.to_string());
    let exact_ids: HashSet<_> = exact.iter().map(identity).collect();

    let mut union = exact;
    union.extend(prefix.into_iter().filter(|row| !exact_ids.contains(&identity(row))));
    trace!("{} candidate postings", union.len());
    union
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn row(key: &str, id: &str, value: Value) -> ViewRow {
        ViewRow {
            key: key.to_string(),
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_query_terms_are_deduplicated() {
        let terms = query_terms(vec!["b".into(), "a".into(), "b".into()]);

        assert_eq!(terms, vec!["b", "a"]);
    }

    #[test]
    fn test_union_prefers_exact_rows() {
        let exact = vec![
            row("aquick", "2", Value::Null),
            row("aquick", "2", Value::Null),
        ];
        let prefix = vec![
            row("aquick", "2", Value::Null),
            row("aquick", "2", Value::Null),
            row("aquickly", "3", Value::Null),
            row("aquick", "4", json!(1)),
        ];

        let union = union_postings(exact, prefix);

        let keys: Vec<(&str, &str)> = union.iter().map(|r| (r.key.as_str(), r.id.as_str())).collect();
        assert_eq!(
            keys,
            vec![("aquick", "2"), ("aquick", "2"), ("aquickly", "3"), ("aquick", "4")]
        );
    }
}
