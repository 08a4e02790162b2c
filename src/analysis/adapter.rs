//! Tokenization adapter.
//!
//! Turns text into the term strings used as index keys and query terms.
//! Indexing keeps both the stemmed root and the trimmed surface form of every
//! word so either spelling finds the document. Querying keeps wildcard tokens
//! exactly as typed so the wildcard matcher sees the user's pattern.

use std::iter;

use crate::analysis::pipeline::{Pipeline, PipelineStages};
use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Marker that turns a query token into a wildcard pattern.
pub const WILDCARD_MARKER: char = '*';

/// Whether text is tokenized for the index or for a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenizeMode {
    /// Emit stemmed forms plus distinct surface forms.
    Index,
    /// Emit stemmed forms, keeping wildcard tokens verbatim.
    Query,
}

/// A pipeline with its stages resolved for repeated tokenization.
#[derive(Clone, Debug)]
pub struct TermAnalyzer {
    pipeline: Pipeline,
    stages: PipelineStages,
}

impl TermAnalyzer {
    /// Resolve the stages of `pipeline`.
    pub fn new(pipeline: Pipeline) -> Result<Self> {
        let stages = pipeline.stages()?;
        Ok(TermAnalyzer { pipeline, stages })
    }

    /// Get the underlying pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Tokenize `text` into an ordered sequence of terms.
    pub fn tokenize(&self, text: &str, mode: TokenizeMode) -> Result<Vec<String>> {
        let is_query = mode == TokenizeMode::Query;

        // (term, verbatim) for every token that survives trimming and stop words.
        let mut trimmed: Vec<(String, bool)> = Vec::new();
        for token in self.pipeline.raw_tokens(text)? {
            if is_query && token.text.contains(WILDCARD_MARKER) {
                trimmed.push((token.text, true));
                continue;
            }
            let mut stream = self.stages.trimmer.filter(single(token))?;
            for stop_word_filter in &self.stages.stop_word_filters {
                stream = stop_word_filter.filter(stream)?;
            }
            if let Some(survivor) = stream.find(|t| !t.is_stopped() && !t.is_empty()) {
                trimmed.push((survivor.text, false));
            }
        }

        let mut terms = Vec::with_capacity(trimmed.len() * 2);
        for (position, (term, verbatim)) in trimmed.iter().enumerate() {
            if *verbatim {
                terms.push(term.clone());
                continue;
            }
            let mut stream = single(Token::new(term.as_str(), position));
            for stemmer in &self.stages.stemmers {
                stream = stemmer.filter(stream)?;
            }
            terms.extend(stream.map(|t| t.text).filter(|t| !t.is_empty()));
        }

        if mode == TokenizeMode::Index {
            for (term, _) in trimmed {
                if !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }

        Ok(terms)
    }
}

/// Tokenize `text` with a pipeline whose stages are resolved on the fly.
pub fn tokenize(text: &str, pipeline: &Pipeline, is_query: bool) -> Result<Vec<String>> {
    let mode = if is_query {
        TokenizeMode::Query
    } else {
        TokenizeMode::Index
    };
    TermAnalyzer::new(pipeline.clone())?.tokenize(text, mode)
}

fn single(token: Token) -> TokenStream {
    Box::new(iter::once(token))
}
