//! Highlighting of matched terms in field text.

use regex::Regex;

use crate::error::{MapSearchError, Result};

/// Markup placed around highlighted matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Inserted before every match.
    pub pre: String,
    /// Inserted after every match.
    pub post: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            pre: "<strong>".to_string(),
            post: "</strong>".to_string(),
        }
    }
}

impl HighlightConfig {
    /// Create a new highlight configuration with the default markup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the opening markup.
    pub fn pre<S: Into<String>>(mut self, pre: S) -> Self {
        self.pre = pre.into();
        self
    }

    /// Set the closing markup.
    pub fn post<S: Into<String>>(mut self, post: S) -> Self {
        self.post = post.into();
        self
    }

    /// Wrap every case-insensitive occurrence of each term in `text`.
    ///
    /// A match extends over trailing ASCII letters so that a stemmed term
    /// highlights the whole word (`jump` marks `jumping`). All terms are
    /// matched in one pass, so inserted markup is never matched again.
    pub fn highlight<S: AsRef<str>>(&self, text: &str, terms: &[S]) -> Result<String> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|term| term.as_ref())
            .filter(|term| !term.is_empty())
            .map(|term| format!("{}[a-z]*", regex::escape(term)))
            .collect();
        if alternatives.is_empty() {
            return Ok(text.to_string());
        }

        let pattern = format!("(?i)({})", alternatives.join("|"));
        let regex = Regex::new(&pattern)
            .map_err(|e| MapSearchError::query(format!("invalid highlight term: {e}")))?;
        let replacement = format!(
            "{}${{1}}{}",
            escape_dollars(&self.pre),
            escape_dollars(&self.post)
        );

        Ok(regex.replace_all(text, replacement.as_str()).into_owned())
    }
}

fn escape_dollars(markup: &str) -> String {
    markup.replace('$', "$$")
}
