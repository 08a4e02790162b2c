//! # mapsearch
//!
//! Full-text search for document stores that only offer map/reduce views and
//! key-range queries.
//!
//! ## Features
//!
//! - Inverted index derived incrementally through the host's views
//! - TF-IDF scoring with field length norms and per-field boosts
//! - Minimum should match, prefix and wildcard terms
//! - Highlighting of matched terms
//! - Per-language analysis pipelines (English built in)
//! - In-memory reference store

pub mod analysis;
pub mod error;
pub mod field;
pub mod index;
pub mod search;
pub mod store;

pub mod prelude {
    pub use crate::error::{MapSearchError, Result};
    pub use crate::field::FieldSpec;
    pub use crate::search::{SearchOptions, SearchResponse, SearchRow, Searcher};
    pub use crate::store::{DocumentStore, MemoryStore};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
