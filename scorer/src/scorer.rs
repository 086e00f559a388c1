//! @ai:module:intent Score one hypothesis against one or more references
//! @ai:module:layer application
//! @ai:module:public_api Scorer, References, PairReport
//! @ai:module:depends_on tokenizer, ngram, lcs, metric
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::lcs::lcs_length;
use crate::metric::{FMeasure, Metric, MetricResult, ScoreConfig};
use crate::ngram::{clipped_overlap, extract_ngrams};
use crate::tokenizer::{DefaultTokenizer, Token, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent One reference or a set of acceptable references for a hypothesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum References<'a> {
    Single(&'a str),
    Multiple(Vec<&'a str>),
}

impl<'a> References<'a> {
    /// @ai:intent View the references as a slice-like list
    /// @ai:post errors when a multi-reference set is empty
    /// @ai:effects pure
    pub fn to_vec(&self) -> Result<Vec<&'a str>> {
        match self {
            References::Single(text) => Ok(vec![*text]),
            References::Multiple(texts) if texts.is_empty() => Err(Error::Input(
                "reference set must contain at least one reference".to_string(),
            )),
            References::Multiple(texts) => Ok(texts.clone()),
        }
    }
}

impl<'a> From<&'a str> for References<'a> {
    fn from(text: &'a str) -> Self {
        References::Single(text)
    }
}

impl<'a> From<&'a String> for References<'a> {
    fn from(text: &'a String) -> Self {
        References::Single(text.as_str())
    }
}

impl<'a, S: AsRef<str>> From<&'a [S]> for References<'a> {
    fn from(texts: &'a [S]) -> Self {
        References::Multiple(texts.iter().map(AsRef::as_ref).collect())
    }
}

impl<'a, S: AsRef<str>> From<&'a Vec<S>> for References<'a> {
    fn from(texts: &'a Vec<S>) -> Self {
        texts.as_slice().into()
    }
}

impl<'a, S: AsRef<str>, const N: usize> From<&'a [S; N]> for References<'a> {
    fn from(texts: &'a [S; N]) -> Self {
        texts.as_slice().into()
    }
}

/// @ai:intent Scores of every requested metric for one pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairReport {
    scores: BTreeMap<Metric, MetricResult>,
}

impl PairReport {
    pub fn get(&self, metric: Metric) -> Option<&MetricResult> {
        self.scores.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricResult)> + '_ {
        self.scores.iter().map(|(m, r)| (*m, r))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(Metric, MetricResult)> for PairReport {
    fn from_iter<I: IntoIterator<Item = (Metric, MetricResult)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// @ai:intent ROUGE scorer parameterised by a tokenization strategy
#[derive(Debug, Clone)]
pub struct Scorer<T: Tokenizer = DefaultTokenizer> {
    tokenizer: T,
    config: ScoreConfig,
}

impl Scorer<DefaultTokenizer> {
    /// @ai:intent Scorer with the default tokenizer and all three metrics
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            tokenizer: DefaultTokenizer,
            config: ScoreConfig::default(),
        }
    }

    /// @ai:intent Scorer with the default tokenizer and a custom config
    /// @ai:effects pure
    pub fn with_config(config: ScoreConfig) -> Result<Self> {
        Self::with_tokenizer(DefaultTokenizer, config)
    }
}

impl Default for Scorer<DefaultTokenizer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tokenizer> Scorer<T> {
    /// @ai:intent Scorer with an injected tokenizer
    /// @ai:pre config selects at least one metric
    /// @ai:effects pure
    pub fn with_tokenizer(tokenizer: T, config: ScoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { tokenizer, config })
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// @ai:intent Tokenize text with this scorer's strategy
    /// @ai:effects pure
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenizer.split(text)
    }

    /// @ai:intent Score a hypothesis against one reference or the best of several
    /// @ai:pre multi-reference sets are non-empty
    /// @ai:effects pure
    pub fn score_pair<'r>(
        &self,
        hypothesis: &str,
        references: impl Into<References<'r>>,
    ) -> Result<PairReport> {
        let references = references.into().to_vec()?;
        let hyp_tokens = self.tokenize(hypothesis);
        let ref_tokens: Vec<Vec<Token>> = references.iter().map(|r| self.tokenize(r)).collect();
        let ref_slices: Vec<&[Token]> = ref_tokens.iter().map(Vec::as_slice).collect();

        self.score_tokens(&hyp_tokens, &ref_slices)
    }

    /// @ai:intent Score pre-tokenized input, keeping the max-F1 reference per metric
    /// @ai:pre references is non-empty
    /// @ai:effects pure
    pub fn score_tokens(&self, hypothesis: &[Token], references: &[&[Token]]) -> Result<PairReport> {
        if references.is_empty() {
            return Err(Error::Input(
                "reference set must contain at least one reference".to_string(),
            ));
        }

        let report = self
            .config
            .metrics
            .iter()
            .map(|metric| {
                let best = references
                    .iter()
                    .map(|reference| self.score_metric(metric, hypothesis, reference))
                    .fold(None, |best: Option<MetricResult>, candidate| match best {
                        Some(current) if current.f1 >= candidate.f1 => Some(current),
                        _ => Some(candidate),
                    })
                    .unwrap_or_default();
                (metric, best)
            })
            .collect();

        Ok(report)
    }

    /// @ai:intent Score a single metric on one tokenized pair
    /// @ai:effects pure
    fn score_metric(&self, metric: Metric, hypothesis: &[Token], reference: &[Token]) -> MetricResult {
        match metric {
            Metric::RougeN(n) => rouge_n(hypothesis, reference, n),
            Metric::RougeL => rouge_l(hypothesis, reference, self.config.lcs_f_measure),
        }
    }
}

/// @ai:intent ROUGE-N precision, recall and F1 with clipped n-gram overlap
/// @ai:effects pure
pub fn rouge_n(hypothesis: &[Token], reference: &[Token], n: usize) -> MetricResult {
    let hyp_ngrams = extract_ngrams(hypothesis, n);
    let ref_ngrams = extract_ngrams(reference, n);
    let overlap = clipped_overlap(&hyp_ngrams, &ref_ngrams);

    MetricResult::from_counts(
        overlap,
        hyp_ngrams.total(),
        ref_ngrams.total(),
        FMeasure::Symmetric,
    )
}

/// @ai:intent ROUGE-L precision, recall and F score from the LCS length
/// @ai:effects pure
pub fn rouge_l(hypothesis: &[Token], reference: &[Token], f_measure: FMeasure) -> MetricResult {
    let lcs = lcs_length(hypothesis, reference);
    MetricResult::from_counts(lcs, hypothesis.len(), reference.len(), f_measure)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn self_score_is_perfect(words in prop::collection::vec("[a-d]{1,3}", 2..12)) {
            let text = words.join(" ");
            let report = Scorer::new().score_pair(&text, text.as_str()).unwrap();

            for metric in [Metric::ROUGE_1, Metric::ROUGE_2, Metric::ROUGE_L] {
                let result = report.get(metric).unwrap();
                prop_assert!((result.precision - 1.0).abs() < 1e-12);
                prop_assert!((result.recall - 1.0).abs() < 1e-12);
                prop_assert!((result.f1 - 1.0).abs() < 1e-12);
            }
        }

        #[test]
        fn scores_stay_in_unit_range(
            hyp in prop::collection::vec("[a-d]", 0..10),
            reference in prop::collection::vec("[a-d]", 0..10),
        ) {
            let report = Scorer::new()
                .score_pair(&hyp.join(" "), reference.join(" ").as_str())
                .unwrap();
            for (_, result) in report.iter() {
                for value in [result.precision, result.recall, result.f1] {
                    prop_assert!((0.0..=1.0).contains(&value));
                }
            }
        }
    }
}
