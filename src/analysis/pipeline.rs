//! Labelled analysis pipeline.
//!
//! A [`Pipeline`] combines a raw tokenizer with an ordered list of filter
//! stages. Each stage is classified once, at construction, into a
//! [`StageKind`] from its label. The tokenization adapter relies on this
//! classification to run trimming, stop-word removal and stemming as
//! separate passes.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use mapsearch::analysis::pipeline::Pipeline;
//! use mapsearch::analysis::token_filter::{PorterStemmer, StemFilter, StopFilter, TrimmerFilter};
//! use mapsearch::analysis::tokenizer::SeparatorTokenizer;
//!
//! let pipeline = Pipeline::new(Arc::new(SeparatorTokenizer::new().unwrap()))
//!     .add_stage(Arc::new(TrimmerFilter::new()))
//!     .add_stage(Arc::new(StopFilter::from_words(vec!["the"])))
//!     .add_stage(Arc::new(StemFilter::with_stemmer(Box::new(PorterStemmer::new()))))
//!     .with_name("my_pipeline");
//!
//! let stages = pipeline.stages().unwrap();
//! assert_eq!(stages.stop_word_filters.len(), 1);
//! assert_eq!(stages.stemmers.len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{MapSearchError, Result};

/// Role of a pipeline stage, derived from its label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    /// Strips surrounding punctuation.
    Trimmer,
    /// Reduces a term to its root form.
    Stemmer,
    /// Drops words that carry no meaning.
    StopWordFilter,
    /// Any other stage; ignored by the tokenization adapter.
    Other,
}

impl StageKind {
    /// Classify a stage by label substring.
    pub fn from_label(label: &str) -> Self {
        if label.contains("trimmer") {
            StageKind::Trimmer
        } else if label.contains("stemmer") {
            StageKind::Stemmer
        } else if label.contains("stop_word_filter") {
            StageKind::StopWordFilter
        } else {
            StageKind::Other
        }
    }
}

/// Stages of a pipeline grouped by role, order within each group preserved.
#[derive(Clone)]
pub struct PipelineStages {
    /// The single trimmer stage.
    pub trimmer: Arc<dyn Filter>,
    /// Stemmer stages in pipeline order.
    pub stemmers: Vec<Arc<dyn Filter>>,
    /// Stop-word filter stages in pipeline order.
    pub stop_word_filters: Vec<Arc<dyn Filter>>,
}

/// A tokenizer with an ordered chain of labelled filter stages.
#[derive(Clone)]
pub struct Pipeline {
    tokenizer: Arc<dyn Tokenizer>,
    stages: Vec<Arc<dyn Filter>>,
    name: String,
}

impl Pipeline {
    /// Create a new pipeline with the given tokenizer and no stages.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Pipeline {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            stages: Vec::new(),
        }
    }

    /// Append a stage to the pipeline.
    pub fn add_stage(mut self, stage: Arc<dyn Filter>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Set a custom name for this pipeline.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the tokenizer used by this pipeline.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Run the raw tokenizer only.
    pub fn raw_tokens(&self, text: &str) -> Result<TokenStream> {
        self.tokenizer.tokenize(text)
    }

    /// Group the stages by role.
    ///
    /// Fails unless the pipeline holds exactly one trimmer.
    pub fn stages(&self) -> Result<PipelineStages> {
        let mut trimmers = Vec::new();
        let mut stemmers = Vec::new();
        let mut stop_word_filters = Vec::new();

        for stage in &self.stages {
            match StageKind::from_label(stage.name()) {
                StageKind::Trimmer => trimmers.push(Arc::clone(stage)),
                StageKind::Stemmer => stemmers.push(Arc::clone(stage)),
                StageKind::StopWordFilter => stop_word_filters.push(Arc::clone(stage)),
                StageKind::Other => {}
            }
        }

        if trimmers.len() != 1 {
            return Err(MapSearchError::analysis(format!(
                "pipeline '{}' must have exactly one trimmer, found {}",
                self.name,
                trimmers.len()
            )));
        }

        Ok(PipelineStages {
            trimmer: trimmers.remove(0),
            stemmers,
            stop_word_filters,
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("stages", &labels)
            .finish()
    }
}

impl fmt::Debug for PipelineStages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStages")
            .field("trimmer", &self.trimmer.name())
            .field("stemmers", &self.stemmers.len())
            .field("stop_word_filters", &self.stop_word_filters.len())
            .finish()
    }
}
