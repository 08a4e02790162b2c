//! Trimmer filter implementation.

use std::sync::LazyLock;

use regex::Regex;

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

static LEADING_NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\W+").expect("static pattern"));
static TRAILING_NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+$").expect("static pattern"));

/// A filter that strips leading and trailing non-word characters from tokens.
///
/// Tokens that end up empty are dropped from the stream.
#[derive(Clone, Debug, Default)]
pub struct TrimmerFilter;

impl TrimmerFilter {
    /// Create a new trimmer filter.
    pub fn new() -> Self {
        TrimmerFilter
    }

    /// Trim a single term.
    pub fn trim(text: &str) -> String {
        let text = LEADING_NON_WORD.replace(text, "");
        TRAILING_NON_WORD.replace(&text, "").into_owned()
    }
}

impl Filter for TrimmerFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .filter_map(|token| {
                if token.is_stopped() {
                    return Some(token);
                }
                let trimmed = Self::trim(&token.text);
                if trimmed.is_empty() {
                    None
                } else {
                    Some(token.with_text(trimmed))
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "trimmer"
    }
}
