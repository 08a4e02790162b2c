//! Search options.
//!
//! Options are built either with the builder methods or deserialized from a
//! JSON object:
//!
//! ```
//! use mapsearch::search::SearchOptions;
//!
//! let options = SearchOptions::from_json(
//!     r#"{"q": "quick fox", "fields": {"title": 2, "body": 1}, "mm": "50%", "limit": 10}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.query.as_deref(), Some("quick fox"));
//! assert_eq!(options.minimum_should_match().unwrap(), 0.5);
//! ```
//!
//! Callback options (`filter`, `get_text`) can only be set through the builder.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::analysis::registry::DEFAULT_LANGUAGE;
use crate::error::{MapSearchError, Result};
use crate::field::{DEFAULT_BOOST, FieldSpec, TextExtractor};
use crate::index::DocumentFilter;
use crate::search::highlight::HighlightConfig;
use crate::store::Stale;

/// Options of one search call.
#[derive(Clone)]
pub struct SearchOptions {
    /// Free text query; required unless building or destroying.
    pub query: Option<String>,
    /// Fields to search with their boosts, in declared order.
    pub fields: Vec<(String, f64)>,
    /// Minimum share of query terms a document must match, as a percentage.
    pub mm: Option<String>,
    /// Attach highlighted field text to every row.
    pub highlighting: bool,
    /// Markup inserted before highlighted matches.
    pub highlighting_pre: Option<String>,
    /// Markup inserted after highlighted matches.
    pub highlighting_post: Option<String>,
    /// Attach the full document to every row.
    pub include_docs: bool,
    /// Delete the persisted index.
    pub destroy: bool,
    /// Build the persisted index without querying it.
    pub build: bool,
    /// Refresh policy of index reads.
    pub stale: Option<Stale>,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
    /// Number of rows skipped.
    pub skip: Option<usize>,
    /// Analysis languages.
    pub language: Vec<String>,
    /// Only index documents accepted by this predicate.
    pub filter: Option<DocumentFilter>,
    /// Custom text extractors by field name.
    pub get_text: HashMap<String, TextExtractor>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            query: None,
            fields: Vec::new(),
            mm: None,
            highlighting: false,
            highlighting_pre: None,
            highlighting_post: None,
            include_docs: false,
            destroy: false,
            build: false,
            stale: None,
            limit: None,
            skip: None,
            language: vec![DEFAULT_LANGUAGE.to_string()],
            filter: None,
            get_text: HashMap::new(),
        }
    }
}

impl SearchOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSearchOptions = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Convert options from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawSearchOptions = serde_json::from_value(value)?;
        raw.try_into()
    }

    /// Set the query.
    pub fn query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Search `fields` with the default boost.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(|f| (f.into(), DEFAULT_BOOST)).collect();
        self
    }

    /// Add a field with a boost.
    pub fn field<S: Into<String>>(mut self, field: S, boost: f64) -> Self {
        self.fields.push((field.into(), boost));
        self
    }

    /// Set the minimum should match percentage, e.g. `"75%"`.
    pub fn mm<S: Into<String>>(mut self, mm: S) -> Self {
        self.mm = Some(mm.into());
        self
    }

    /// Enable or disable highlighting.
    pub fn highlighting(mut self, highlighting: bool) -> Self {
        self.highlighting = highlighting;
        self
    }

    /// Set the highlight markup.
    pub fn highlighting_markup<S: Into<String>>(mut self, pre: S, post: S) -> Self {
        self.highlighting_pre = Some(pre.into());
        self.highlighting_post = Some(post.into());
        self
    }

    /// Attach documents to rows.
    pub fn include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    /// Delete the persisted index instead of searching.
    pub fn destroy(mut self, destroy: bool) -> Self {
        self.destroy = destroy;
        self
    }

    /// Build the persisted index instead of searching.
    pub fn build(mut self, build: bool) -> Self {
        self.build = build;
        self
    }

    /// Set the refresh policy.
    pub fn stale(mut self, stale: Stale) -> Self {
        self.stale = Some(stale);
        self
    }

    /// Set the row limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of skipped rows.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Analyze with a single language.
    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = vec![language.into()];
        self
    }

    /// Analyze with several languages at once.
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.language = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Only index documents accepted by `filter`.
    pub fn filter(mut self, filter: DocumentFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Extract the text of `field` with `extractor`.
    pub fn get_text<S: Into<String>>(mut self, field: S, extractor: TextExtractor) -> Self {
        self.get_text.insert(field.into(), extractor);
        self
    }

    /// Minimum should match as a ratio; defaults to `1.0`.
    ///
    /// The leading number of the option is read as a percentage, so `"75%"`
    /// and `"75"` both give `0.75`.
    pub fn minimum_should_match(&self) -> Result<f64> {
        let Some(mm) = self.mm.as_deref() else {
            return Ok(1.0);
        };
        let mm = mm.trim();
        let end = mm
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
            .map(|(i, _)| i)
            .unwrap_or(mm.len());

        mm[..end]
            .parse::<f64>()
            .map(|percent| percent / 100.0)
            .map_err(|_| MapSearchError::invalid_argument(format!("mm must be a percentage, got '{mm}'")))
    }

    /// Resolve the configured fields into field specs.
    pub fn to_field_specs(&self) -> Result<Vec<FieldSpec>> {
        if self.fields.is_empty() {
            return Err(MapSearchError::query("at least one field is required"));
        }
        Ok(self
            .fields
            .iter()
            .map(|(name, boost)| match self.get_text.get(name) {
                Some(extractor) => FieldSpec::with_extractor(name.as_str(), extractor.clone(), *boost),
                None => FieldSpec::new(name.as_str(), *boost),
            })
            .collect())
    }

    /// Highlight markup with the configured overrides.
    pub fn highlight_config(&self) -> HighlightConfig {
        let mut config = HighlightConfig::new();
        if let Some(pre) = &self.highlighting_pre {
            config = config.pre(pre.as_str());
        }
        if let Some(post) = &self.highlighting_post {
            config = config.post(post.as_str());
        }
        config
    }
}

impl fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extractors: Vec<&String> = self.get_text.keys().collect();
        extractors.sort();
        f.debug_struct("SearchOptions")
            .field("query", &self.query)
            .field("fields", &self.fields)
            .field("mm", &self.mm)
            .field("highlighting", &self.highlighting)
            .field("include_docs", &self.include_docs)
            .field("destroy", &self.destroy)
            .field("build", &self.build)
            .field("stale", &self.stale)
            .field("limit", &self.limit)
            .field("skip", &self.skip)
            .field("language", &self.language)
            .field("filter", &self.filter.is_some())
            .field("get_text", &extractors)
            .finish()
    }
}

/// `fields` as a list of names or a name to boost map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFields {
    List(Vec<String>),
    Boosts(serde_json::Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMinimumMatch {
    Text(String),
    Number(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLanguage {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSearchOptions {
    #[serde(alias = "q")]
    query: Option<String>,
    fields: Option<RawFields>,
    mm: Option<RawMinimumMatch>,
    highlighting: bool,
    highlighting_pre: Option<String>,
    highlighting_post: Option<String>,
    include_docs: bool,
    destroy: bool,
    build: bool,
    stale: Option<String>,
    // Negative values mean no limit and no skip.
    limit: Option<i64>,
    skip: Option<i64>,
    language: Option<RawLanguage>,
}

impl TryFrom<RawSearchOptions> for SearchOptions {
    type Error = MapSearchError;

    fn try_from(raw: RawSearchOptions) -> Result<Self> {
        let fields = match raw.fields {
            None => Vec::new(),
            Some(RawFields::List(names)) => names.into_iter().map(|n| (n, DEFAULT_BOOST)).collect(),
            Some(RawFields::Boosts(boosts)) => boosts
                .into_iter()
                .map(|(name, boost)| match boost {
                    Value::Null => Ok((name, DEFAULT_BOOST)),
                    other => other.as_f64().map(|b| (name.clone(), b)).ok_or_else(|| {
                        MapSearchError::invalid_argument(format!("boost of field '{name}' must be a number"))
                    }),
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let language = match raw.language {
            None => vec![DEFAULT_LANGUAGE.to_string()],
            Some(RawLanguage::One(language)) => vec![language],
            Some(RawLanguage::Many(languages)) => languages,
        };

        Ok(SearchOptions {
            query: raw.query,
            fields,
            mm: raw.mm.map(|mm| match mm {
                RawMinimumMatch::Text(text) => text,
                RawMinimumMatch::Number(n) => n.to_string(),
            }),
            highlighting: raw.highlighting,
            highlighting_pre: raw.highlighting_pre,
            highlighting_post: raw.highlighting_post,
            include_docs: raw.include_docs,
            destroy: raw.destroy,
            build: raw.build,
            stale: raw.stale.as_deref().map(str::parse::<Stale>).transpose()?,
            limit: raw.limit.and_then(|limit| usize::try_from(limit).ok()),
            skip: raw.skip.map(|skip| usize::try_from(skip).unwrap_or(0)),
            language,
            filter: None,
            get_text: HashMap::new(),
        })
    }
}
