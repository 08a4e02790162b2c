//! Ranked full-text search over the persisted index.
//!
//! The entry point is [`Searcher::search`]:
//!
//! ```
//! use std::sync::Arc;
//!
//! use mapsearch::search::{SearchOptions, Searcher};
//! use mapsearch::store::MemoryStore;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! store.put(json!({"_id": "1", "text": "the quick fox"})).unwrap();
//! store.put(json!({"_id": "2", "text": "the lazy dog"})).unwrap();
//!
//! let searcher = Searcher::new(store);
//! let response = searcher
//!     .search(SearchOptions::new().query("fox").fields(["text"]))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(response.total_rows(), 1);
//! assert_eq!(response.rows()[0].id, "1");
//! # });
//! ```

pub mod highlight;
pub mod options;
pub mod result_processor;
pub mod scorer;
pub mod searcher;
pub mod stats;
pub mod wildcard;

pub use highlight::HighlightConfig;
pub use options::SearchOptions;
pub use result_processor::{ResultProcessor, SearchHits, SearchResponse, SearchRow};
pub use scorer::{DocumentScore, score};
pub use searcher::Searcher;
pub use stats::TermStatistics;
pub use wildcard::{WildcardPattern, is_wildcard_term, matches_wildcard};
