//! Error types for the mapsearch library.
//!
//! All fallible operations return [`MapSearchError`] through the crate-wide
//! [`Result`] alias.
//!
//! # Examples
//!
//! ```
//! use mapsearch::error::{MapSearchError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MapSearchError::query("no fields to search"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for mapsearch operations.
#[derive(Error, Debug)]
pub enum MapSearchError {
    /// Errors raised by the host document store (query, fetch, persistence).
    #[error("Store error: {0}")]
    Store(String),

    /// Analysis-related errors (pipeline construction, unknown language).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (missing query, invalid options).
    #[error("Query error: {0}")]
    Query(String),

    /// A document filter predicate failed while indexing.
    #[error("Filter error: {0}")]
    Filter(String),

    /// A requested document does not exist in the host store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Errors returned from user supplied callbacks
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with MapSearchError.
pub type Result<T> = std::result::Result<T, MapSearchError>;

impl MapSearchError {
    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        MapSearchError::Store(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        MapSearchError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        MapSearchError::Query(msg.into())
    }

    /// Create a new filter error.
    pub fn filter<S: Into<String>>(msg: S) -> Self {
        MapSearchError::Filter(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        MapSearchError::NotFound(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MapSearchError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MapSearchError::Query(format!("Invalid argument: {}", msg.into()))
    }
}
