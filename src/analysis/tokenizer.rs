//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step of a [`Pipeline`]: they split raw field or
//! query text into tokens before any filter runs.
//!
//! [`Pipeline`]: crate::analysis::pipeline::Pipeline

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so pipelines can be shared through the
/// process-wide registry.
///
/// # Examples
///
/// ```
/// use mapsearch::analysis::token::{Token, TokenStream};
/// use mapsearch::analysis::tokenizer::Tokenizer;
/// use mapsearch::error::Result;
///
/// struct CommaTokenizer;
///
/// impl Tokenizer for CommaTokenizer {
///     fn tokenize(&self, text: &str) -> Result<TokenStream> {
///         let tokens: Vec<Token> = text
///             .split(',')
///             .enumerate()
///             .map(|(i, s)| Token::new(s.trim(), i))
///             .collect();
///         Ok(Box::new(tokens.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "comma"
///     }
/// }
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod separator;

pub use separator::SeparatorTokenizer;
