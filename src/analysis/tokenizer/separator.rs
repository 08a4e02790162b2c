//! Separator tokenizer implementation.
//!
//! Splits text on runs of whitespace and hyphens and lowercases every piece.
//! Punctuation and wildcard markers stay attached to their token; trimming
//! them is the job of the pipeline's trimmer stage, which the query side
//! skips for wildcard tokens.
//!
//! # Examples
//!
//! ```
//! use mapsearch::analysis::tokenizer::Tokenizer;
//! use mapsearch::analysis::tokenizer::separator::SeparatorTokenizer;
//!
//! let tokenizer = SeparatorTokenizer::new().unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("Fox-trot QUI*").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "fox");
//! assert_eq!(tokens[1].text, "trot");
//! assert_eq!(tokens[2].text, "qui*");
//! ```

use std::sync::Arc;

use regex::Regex;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{MapSearchError, Result};

/// Default separator pattern: whitespace and hyphens.
const DEFAULT_SEPARATOR: &str = r"[\s\-]+";

/// A tokenizer that emits the lowercased gaps between separator matches.
#[derive(Clone, Debug)]
pub struct SeparatorTokenizer {
    /// The regex matching separators between tokens
    separator: Arc<Regex>,
}

impl SeparatorTokenizer {
    /// Create a new tokenizer splitting on whitespace and hyphens.
    pub fn new() -> Result<Self> {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    /// Create a tokenizer with a custom separator pattern.
    pub fn with_separator(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| MapSearchError::analysis(format!("Invalid separator pattern: {e}")))?;

        Ok(SeparatorTokenizer {
            separator: Arc::new(regex),
        })
    }
}

impl Tokenizer for SeparatorTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut last_end = 0;

        let mut push_gap = |start: usize, end: usize| {
            let gap = &text[start..end];
            if !gap.is_empty() {
                let position = tokens.len();
                tokens.push(Token::with_offsets(gap.to_lowercase(), position, start, end));
            }
        };

        for mat in self.separator.find_iter(text) {
            push_gap(last_end, mat.start());
            last_end = mat.end();
        }
        push_gap(last_end, text.len());

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "separator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_tokenizer() {
        let tokenizer = SeparatorTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("  Hello   World ").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[0].start_offset, 2);
        assert_eq!(tokens[0].end_offset, 7);

        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 10);
        assert_eq!(tokens[1].end_offset, 15);
    }

    #[test]
    fn test_hyphen_splits_and_punctuation_stays() {
        let tokenizer = SeparatorTokenizer::new().unwrap();
        let tokens: Vec<String> = tokenizer
            .tokenize("state-of-the-art, really!")
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(tokens, vec!["state", "of", "the", "art,", "really!"]);
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = SeparatorTokenizer::new().unwrap();
        assert_eq!(tokenizer.tokenize("   ").unwrap().count(), 0);
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(SeparatorTokenizer::new().unwrap().name(), "separator");
    }
}
