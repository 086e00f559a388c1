//! @ai:module:intent Define error types for the ROUGE scoring engine
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use thiserror::Error;

/// @ai:intent Unified error type for all scoring operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Alignment error: {hypotheses} hypotheses but {references} references")]
    Alignment {
        hypotheses: usize,
        references: usize,
    },

    #[error("Cannot aggregate an empty corpus")]
    EmptyCorpus,

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid tokenizer pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
