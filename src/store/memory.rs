//! In-memory document store with incremental persisted views.
//!
//! Every write bumps a store-wide update sequence. A persisted view remembers
//! the last sequence it has seen and the rows each document emitted, so a
//! refresh only re-maps documents changed since then and retracts the rows
//! of deleted documents. Useful for tests and for embedding the search core
//! without an external database.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{MapSearchError, Result};
use crate::store::{
    DocumentStore, Emitter, MapFunction, QueryOptions, QueryResponse, Stale, ViewRow,
};

/// Index entry key: (row key, document id, emission number within the document).
type RowKey = (String, String, usize);

#[derive(Debug)]
struct StoredDocument {
    doc: Value,
    seq: u64,
    deleted: bool,
}

#[derive(Debug, Default)]
struct View {
    last_seq: u64,
    keys_by_doc: HashMap<String, Vec<RowKey>>,
    index: BTreeMap<RowKey, Value>,
}

#[derive(Debug, Default)]
struct StoreState {
    seq: u64,
    docs: BTreeMap<String, StoredDocument>,
    views: HashMap<String, View>,
    map_errors: Vec<String>,
}

/// Collects the rows and errors of one document.
struct RowCollector {
    rows: Vec<(String, Value)>,
    errors: Vec<MapSearchError>,
}

impl Emitter for RowCollector {
    fn emit(&mut self, key: String, value: Value) {
        self.rows.push((key, value));
    }

    fn report_error(&mut self, error: MapSearchError) {
        self.errors.push(error);
    }
}

/// An in-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    queries: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document. The document must carry a string `_id`.
    pub fn put(&self, doc: Value) -> Result<String> {
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| MapSearchError::invalid_argument("document has no string _id"))?
            .to_string();

        let mut state = self.state.lock();
        state.seq += 1;
        let seq = state.seq;
        state.docs.insert(
            id.clone(),
            StoredDocument {
                doc,
                seq,
                deleted: false,
            },
        );
        Ok(id)
    }

    /// Delete a document.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.seq += 1;
        let seq = state.seq;
        match state.docs.get_mut(id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                stored.seq = seq;
                Ok(())
            }
            _ => Err(MapSearchError::not_found(id.to_string())),
        }
    }

    /// Number of live documents.
    pub fn len(&self) -> usize {
        self.state.lock().docs.values().filter(|d| !d.deleted).count()
    }

    /// Check whether the store holds no live documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the persisted views.
    pub fn view_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().views.keys().cloned().collect();
        names.sort();
        names
    }

    /// Errors reported by map functions so far.
    pub fn map_errors(&self) -> Vec<String> {
        self.state.lock().map_errors.clone()
    }

    /// Number of view queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl StoreState {
    /// Re-map every document changed since the view last saw the store.
    fn refresh(&mut self, name: &str, map_fn: &dyn MapFunction) {
        let StoreState {
            seq,
            docs,
            views,
            map_errors,
        } = self;
        let view = views.entry(name.to_string()).or_default();

        let since = view.last_seq;
        let mut remapped = 0usize;
        for (id, stored) in docs.iter().filter(|(_, d)| d.seq > since) {
            for key in view.keys_by_doc.remove(id).unwrap_or_default() {
                view.index.remove(&key);
            }
            if stored.deleted {
                continue;
            }

            let mut collector = RowCollector {
                rows: Vec::new(),
                errors: Vec::new(),
            };
            map_fn.map(&stored.doc, &mut collector);
            for error in collector.errors {
                warn!("map function failed on document '{id}': {error}");
                map_errors.push(error.to_string());
            }

            let mut keys = Vec::with_capacity(collector.rows.len());
            for (n, (key, value)) in collector.rows.into_iter().enumerate() {
                let row_key = (key, id.clone(), n);
                view.index.insert(row_key.clone(), value);
                keys.push(row_key);
            }
            view.keys_by_doc.insert(id.clone(), keys);
            remapped += 1;
        }

        if remapped > 0 {
            debug!("view '{name}' re-mapped {remapped} document(s)");
        }
        view.last_seq = *seq;
    }
}

impl View {
    fn read(&self, options: &QueryOptions) -> QueryResponse {
        let limit = options.limit.unwrap_or(usize::MAX);
        let mut rows = Vec::new();

        let mut push = |(key, value): (&RowKey, &Value)| {
            rows.push(ViewRow {
                key: key.0.clone(),
                id: key.1.clone(),
                value: value.clone(),
            });
        };

        if let Some(keys) = &options.keys {
            for wanted in keys {
                let start = (wanted.clone(), String::new(), 0);
                self.index
                    .range(start..)
                    .take_while(|(key, _)| &key.0 == wanted)
                    .for_each(&mut push);
            }
        } else {
            let start = options.start_key.clone().unwrap_or_default();
            let lower = Bound::Included((start, String::new(), 0));
            self.index
                .range((lower, Bound::Unbounded))
                .take_while(|(key, _)| match &options.end_key {
                    Some(end) => &key.0 <= end,
                    None => true,
                })
                .for_each(&mut push);
        }

        rows.truncate(limit);
        trace!("view read returned {} row(s)", rows.len());
        QueryResponse {
            total_rows: self.index.len(),
            rows,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        map_fn: Arc<dyn MapFunction>,
        options: QueryOptions,
    ) -> Result<QueryResponse> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock();

        let Some(name) = options.save_as.clone() else {
            // Temporary view, built from scratch for this query.
            let mut scratch = StoreState {
                seq: state.seq,
                docs: std::mem::take(&mut state.docs),
                ..Default::default()
            };
            scratch.refresh("", map_fn.as_ref());
            let response = scratch.views[""].read(&options);
            state.docs = scratch.docs;
            state.map_errors.extend(scratch.map_errors);
            return Ok(response);
        };

        if options.destroy {
            debug!("destroying view '{name}'");
            state.views.remove(&name);
            return Ok(QueryResponse::default());
        }

        let exists = state.views.contains_key(&name);
        match options.stale {
            None => state.refresh(&name, map_fn.as_ref()),
            Some(_) if !exists => state.refresh(&name, map_fn.as_ref()),
            Some(Stale::Ok) | Some(Stale::UpdateAfter) => {}
        }

        let response = state.views[&name].read(&options);
        if options.stale == Some(Stale::UpdateAfter) {
            state.refresh(&name, map_fn.as_ref());
        }
        Ok(response)
    }

    async fn get(&self, id: &str) -> Result<Value> {
        let state = self.state.lock();
        match state.docs.get(id) {
            Some(stored) if !stored.deleted => Ok(stored.doc.clone()),
            _ => Err(MapSearchError::not_found(format!("document '{id}'"))),
        }
    }
}
