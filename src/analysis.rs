//! Text analysis for indexing and querying.
//!
//! Tokenizers split raw text, labelled filter stages trim, remove stop words
//! and stem, and the [`adapter`] turns the result into index or query terms.
//! The [`registry`] caches compiled pipelines per language.

pub mod adapter;
pub mod pipeline;
pub mod registry;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use adapter::{TermAnalyzer, TokenizeMode, tokenize};
pub use pipeline::{Pipeline, PipelineStages, StageKind};
pub use registry::{LanguagePipelines, PipelineRegistry};
pub use token::{Token, TokenStream};
