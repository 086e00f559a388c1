//! @ai:module:intent Split raw text into normalized tokens
//! @ai:module:layer domain
//! @ai:module:public_api Token, Tokenizer, DefaultTokenizer, PatternTokenizer, tokenize
//! @ai:module:stateless true

use crate::error::Result;
use regex::Regex;

/// A normalized unit of text.
pub type Token = String;

/// @ai:intent Pluggable token-splitting strategy
pub trait Tokenizer: Send + Sync {
    /// @ai:intent Split text into an ordered sequence of tokens
    /// @ai:post never fails; empty input yields an empty vector
    fn split(&self, text: &str) -> Vec<Token>;
}

/// @ai:intent Split on runs of non-alphanumeric characters and lowercase each piece
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl Tokenizer for DefaultTokenizer {
    /// @ai:effects pure
    fn split(&self, text: &str) -> Vec<Token> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|piece| !piece.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

/// @ai:intent Regex-driven tokenizer where the pattern matches separators
#[derive(Debug, Clone)]
pub struct PatternTokenizer {
    separator: Regex,
    lowercase: bool,
}

impl PatternTokenizer {
    /// @ai:intent Build a tokenizer from a separator pattern
    /// @ai:pre pattern is a valid regular expression
    /// @ai:effects pure
    pub fn new(pattern: &str, lowercase: bool) -> Result<Self> {
        Ok(Self {
            separator: Regex::new(pattern)?,
            lowercase,
        })
    }

    /// @ai:intent Separator pattern this tokenizer splits on
    pub fn pattern(&self) -> &str {
        self.separator.as_str()
    }
}

impl Tokenizer for PatternTokenizer {
    /// @ai:effects pure
    fn split(&self, text: &str) -> Vec<Token> {
        self.separator
            .split(text)
            .filter(|piece| !piece.is_empty())
            .map(|piece| {
                if self.lowercase {
                    piece.to_lowercase()
                } else {
                    piece.to_string()
                }
            })
            .collect()
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn split(&self, text: &str) -> Vec<Token> {
        (**self).split(text)
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for std::sync::Arc<T> {
    fn split(&self, text: &str) -> Vec<Token> {
        (**self).split(text)
    }
}

/// @ai:intent Tokenize with the default strategy
/// @ai:effects pure
pub fn tokenize(text: &str) -> Vec<Token> {
    DefaultTokenizer.split(text)
}
