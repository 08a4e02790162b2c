//! Wildcard term detection and matching.
//!
//! Only three pattern shapes are supported: `prefix*`, `*suffix`/`pre*suf`
//! and `*infix*`. Anything else never matches.

use crate::analysis::adapter::WILDCARD_MARKER;

/// A query term split on the wildcard marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardPattern {
    pattern: String,
    sections: Vec<String>,
}

impl WildcardPattern {
    /// Parse `term`, returning `None` when it is not a wildcard term.
    pub fn parse(term: &str) -> Option<Self> {
        is_wildcard_term(term).then(|| WildcardPattern {
            pattern: term.to_string(),
            sections: term.split(WILDCARD_MARKER).map(str::to_string).collect(),
        })
    }

    /// The pattern as typed.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The sections between wildcard markers.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Literal text every matching term starts with.
    pub fn literal_prefix(&self) -> &str {
        &self.sections[0]
    }

    /// Check whether `text` matches this pattern.
    pub fn matches(&self, text: &str) -> bool {
        matches_wildcard(&self.pattern, &self.sections, text)
    }
}

/// A term is a wildcard term when it splits on `*` into more than one
/// section and at least one section is non-empty.
pub fn is_wildcard_term(term: &str) -> bool {
    let mut sections = term.split(WILDCARD_MARKER);
    let has_literal = sections.clone().any(|s| !s.is_empty());
    sections.nth(1).is_some() && has_literal
}

/// Match `text` against `pattern` already split into `sections`.
pub fn matches_wildcard<S: AsRef<str>>(pattern: &str, sections: &[S], text: &str) -> bool {
    let infix = pattern.starts_with(WILDCARD_MARKER) && pattern.ends_with(WILDCARD_MARKER);
    match sections {
        [_, mid, _] if infix => text.contains(mid.as_ref()),
        [head, tail] => text.starts_with(head.as_ref()) && text.ends_with(tail.as_ref()),
        _ => false,
    }
}
