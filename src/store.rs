//! Host document store interface.
//!
//! The search core never stores anything itself. It hands a [`MapFunction`]
//! to a [`DocumentStore`], which runs it over every document, persists the
//! emitted rows under a view name and keeps them up to date as documents
//! change. Queries are key lookups and key-range scans over those rows.

use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MapSearchError, Result};

pub mod memory;

pub use memory::MemoryStore;

/// Sink for rows emitted by a map function.
pub trait Emitter {
    /// Emit one key/value row for the document being mapped.
    fn emit(&mut self, key: String, value: Value);

    /// Report a non-fatal error raised while mapping a document.
    fn report_error(&mut self, error: MapSearchError);
}

/// A map function the host runs over every document of a view.
///
/// Implementations must be deterministic for a given document content: the
/// host may re-run them at any time and replaces the rows previously emitted
/// for that document.
pub trait MapFunction: Send + Sync + Debug {
    /// Emit the rows of one document.
    fn map(&self, doc: &Value, emitter: &mut dyn Emitter);
}

/// When a persisted view is brought up to date relative to a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stale {
    /// Read whatever is persisted, never refresh.
    Ok,
    /// Read what is persisted, then refresh.
    UpdateAfter,
}

impl FromStr for Stale {
    type Err = MapSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ok" => Ok(Stale::Ok),
            "update_after" => Ok(Stale::UpdateAfter),
            other => Err(MapSearchError::invalid_argument(format!(
                "stale must be 'ok' or 'update_after', got '{other}'"
            ))),
        }
    }
}

/// Options of a view query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    /// Return only rows with exactly these keys, in this key order.
    pub keys: Option<Vec<String>>,
    /// Inclusive lower bound of a key range scan.
    pub start_key: Option<String>,
    /// Inclusive upper bound of a key range scan.
    pub end_key: Option<String>,
    /// Refresh policy; `None` refreshes before reading.
    pub stale: Option<Stale>,
    /// Name under which the view is persisted.
    pub save_as: Option<String>,
    /// Delete the persisted view instead of querying it.
    pub destroy: bool,
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
    /// Keys are complete row keys; the host may skip its per-key collation.
    pub raw_keys: bool,
}

impl QueryOptions {
    /// Options for the persisted view `name`.
    pub fn saved_as<S: Into<String>>(name: S) -> Self {
        QueryOptions {
            save_as: Some(name.into()),
            ..Default::default()
        }
    }

    /// Restrict to exact keys.
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Restrict to an inclusive key range.
    pub fn with_range<S: Into<String>>(mut self, start_key: S, end_key: S) -> Self {
        self.start_key = Some(start_key.into());
        self.end_key = Some(end_key.into());
        self
    }

    /// Set the refresh policy.
    pub fn with_stale(mut self, stale: Option<Stale>) -> Self {
        self.stale = stale;
        self
    }

    /// Set the row limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One persisted view row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// Emitted key.
    pub key: String,
    /// Id of the document that emitted the row.
    pub id: String,
    /// Emitted value; `null` when nothing was emitted.
    pub value: Value,
}

/// Rows returned by a view query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Number of rows in the whole view.
    pub total_rows: usize,
    /// Matching rows in key order.
    pub rows: Vec<ViewRow>,
}

/// The host document store.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Query (or destroy) the view produced by `map_fn`.
    async fn query(
        &self,
        map_fn: Arc<dyn MapFunction>,
        options: QueryOptions,
    ) -> Result<QueryResponse>;

    /// Fetch a document by id.
    async fn get(&self, id: &str) -> Result<Value>;
}
