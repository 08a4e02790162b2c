//! Token filter implementations for token transformation.
//!
//! Filters are the labelled stages of a [`Pipeline`]. The label returned by
//! [`Filter::name`] decides which role the stage plays during tokenization:
//! a trimmer, a stemmer or a stop-word filter.
//!
//! [`Pipeline`]: crate::analysis::pipeline::Pipeline

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the label of this filter.
    fn name(&self) -> &'static str;
}

pub mod stem;
pub mod stop;
pub mod trimmer;

pub use stem::{PorterStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;
pub use trimmer::TrimmerFilter;
