//! @ai:module:intent ROUGE scoring engine for evaluating generated summaries
//! @ai:module:layer domain
//! @ai:module:public_api tokenizer, ngram, lcs, metric, scorer, corpus, output, error
//! @ai:module:stateless true
//!
//! # ROUGE Scorer
//!
//! Computes ROUGE-N (clipped n-gram overlap) and ROUGE-L (longest common
//! subsequence) precision, recall and F1 between hypotheses and references,
//! for single pairs and for whole corpora.
//!
//! ## Example
//!
//! ```rust
//! use rouge_scorer::{score_corpus, score_pair, Metric};
//!
//! let pair = score_pair("the cat sat", "the cat sat on the mat").unwrap();
//! assert_eq!(pair.get(Metric::ROUGE_1).unwrap().precision, 1.0);
//!
//! let corpus = score_corpus(&["the cat"], &["the dog"]).unwrap();
//! assert_eq!(corpus.get(Metric::ROUGE_1).unwrap().f1, 0.5);
//! ```

pub mod corpus;
pub mod error;
pub mod lcs;
pub mod metric;
pub mod ngram;
pub mod output;
pub mod scorer;
pub mod tokenizer;

pub use corpus::{check_alignment, CorpusAccumulator, CorpusReport};
pub use error::{Error, Result};
pub use lcs::lcs_length;
pub use metric::{FMeasure, Metric, MetricResult, MetricSet, ScoreConfig};
pub use ngram::{clipped_overlap, extract_ngrams, NgramCounts};
pub use output::{format_corpus_report, format_pair_report, to_json, OutputFormat};
pub use scorer::{rouge_l, rouge_n, PairReport, References, Scorer};
pub use tokenizer::{tokenize, DefaultTokenizer, PatternTokenizer, Token, Tokenizer};

/// @ai:intent Score one pair with the default tokenizer and all three metrics
/// @ai:effects pure
pub fn score_pair<'r>(hypothesis: &str, references: impl Into<References<'r>>) -> Result<PairReport> {
    Scorer::new().score_pair(hypothesis, references)
}

/// @ai:intent Score an aligned corpus with the default tokenizer and all three metrics
/// @ai:pre hypotheses.len() == references.len() > 0
/// @ai:effects pure
pub fn score_corpus<H: AsRef<str>, R: AsRef<str>>(
    hypotheses: &[H],
    references: &[R],
) -> Result<CorpusReport> {
    Scorer::new().score_corpus(hypotheses, references)
}
