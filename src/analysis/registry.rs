//! Process-wide registry of per-language analysis pipelines.
//!
//! A language configuration (one language or a list of languages) is
//! compiled into a [`LanguagePipelines`] pair the first time it is used and
//! never changes afterwards. Two callers racing on first use may both build
//! the pair; the first insert wins and the other copy is dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use log::debug;
use parking_lot::RwLock;

use crate::analysis::adapter::TermAnalyzer;
use crate::analysis::pipeline::Pipeline;
use crate::analysis::token_filter::{StemFilter, StopFilter, TrimmerFilter};
use crate::analysis::tokenizer::SeparatorTokenizer;
use crate::error::{MapSearchError, Result};

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Builds the pipeline of a single language.
pub type PipelineFactory = Arc<dyn Fn() -> Result<Pipeline> + Send + Sync>;

static GLOBAL_REGISTRY: LazyLock<Arc<PipelineRegistry>> =
    LazyLock::new(|| Arc::new(PipelineRegistry::new()));

/// The compiled pipelines of one language configuration.
#[derive(Clone, Debug)]
pub struct LanguagePipelines {
    /// Pipeline applied to query strings.
    pub search_pipeline: Arc<TermAnalyzer>,
    /// Pipeline applied to document text by the index map function.
    pub index_pipeline: Arc<TermAnalyzer>,
}

impl LanguagePipelines {
    /// Build both pipelines from the same definition.
    pub fn from_pipeline(pipeline: Pipeline) -> Result<Self> {
        let analyzer = Arc::new(TermAnalyzer::new(pipeline)?);
        Ok(LanguagePipelines {
            search_pipeline: Arc::clone(&analyzer),
            index_pipeline: analyzer,
        })
    }
}

/// Registry mapping language configurations to compiled pipelines.
pub struct PipelineRegistry {
    factories: RwLock<HashMap<String, PipelineFactory>>,
    compiled: RwLock<HashMap<String, Arc<LanguagePipelines>>>,
}

impl PipelineRegistry {
    /// Create a registry that knows the built-in languages.
    pub fn new() -> Self {
        let registry = PipelineRegistry {
            factories: RwLock::new(HashMap::new()),
            compiled: RwLock::new(HashMap::new()),
        };
        registry.register(DEFAULT_LANGUAGE, Arc::new(english_pipeline));
        registry
    }

    /// The shared process-wide registry.
    pub fn global() -> Arc<PipelineRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Register (or replace) the pipeline definition of a language.
    ///
    /// Configurations already compiled keep their pipelines.
    pub fn register<S: Into<String>>(&self, language: S, factory: PipelineFactory) {
        self.factories.write().insert(language.into(), factory);
    }

    /// Check whether a language definition is registered.
    pub fn is_registered(&self, language: &str) -> bool {
        self.factories.read().contains_key(language)
    }

    /// Get the pipelines for a language configuration, compiling them on first use.
    pub fn pipelines(&self, languages: &[String]) -> Result<Arc<LanguagePipelines>> {
        let key = languages.join("+");
        if let Some(compiled) = self.compiled.read().get(&key) {
            return Ok(Arc::clone(compiled));
        }

        debug!("compiling analysis pipelines for language '{key}'");
        let built = Arc::new(LanguagePipelines::from_pipeline(self.build(languages)?)?);

        let mut compiled = self.compiled.write();
        Ok(Arc::clone(compiled.entry(key).or_insert(built)))
    }

    fn build(&self, languages: &[String]) -> Result<Pipeline> {
        let factories = languages
            .iter()
            .map(|language| {
                self.factories.read().get(language).cloned().ok_or_else(|| {
                    MapSearchError::analysis(format!("unsupported language '{language}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut pipelines = factories
            .iter()
            .map(|factory| factory())
            .collect::<Result<Vec<_>>>()?;

        match pipelines.len() {
            0 => Err(MapSearchError::analysis("no language configured")),
            1 => Ok(pipelines.remove(0)),
            _ => combine(&pipelines, &languages.join("+")),
        }
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<String> = self.factories.read().keys().cloned().collect();
        languages.sort();
        f.debug_struct("PipelineRegistry")
            .field("languages", &languages)
            .field("compiled", &self.compiled.read().len())
            .finish()
    }
}

/// The built-in English pipeline.
pub fn english_pipeline() -> Result<Pipeline> {
    Ok(Pipeline::new(Arc::new(SeparatorTokenizer::new()?))
        .add_stage(Arc::new(TrimmerFilter::new()))
        .add_stage(Arc::new(StopFilter::new()))
        .add_stage(Arc::new(StemFilter::new()))
        .with_name(DEFAULT_LANGUAGE))
}

/// One trimmer, then every language's stop-word filters, then every stemmer.
fn combine(pipelines: &[Pipeline], name: &str) -> Result<Pipeline> {
    let all_stages = pipelines
        .iter()
        .map(Pipeline::stages)
        .collect::<Result<Vec<_>>>()?;

    let mut combined = Pipeline::new(Arc::clone(pipelines[0].tokenizer()))
        .add_stage(Arc::clone(&all_stages[0].trimmer));
    for stages in &all_stages {
        for stop_word_filter in &stages.stop_word_filters {
            combined = combined.add_stage(Arc::clone(stop_word_filter));
        }
    }
    for stages in &all_stages {
        for stemmer in &stages.stemmers {
            combined = combined.add_stage(Arc::clone(stemmer));
        }
    }

    Ok(combined.with_name(name))
}
