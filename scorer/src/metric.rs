//! @ai:module:intent Metric variants, metric selection and precision/recall/F results
//! @ai:module:layer domain
//! @ai:module:public_api Metric, MetricSet, MetricResult, FMeasure, ScoreConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// @ai:intent A ROUGE variant: n-gram overlap of order n, or LCS-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    RougeN(usize),
    RougeL,
}

impl Metric {
    pub const ROUGE_1: Metric = Metric::RougeN(1);
    pub const ROUGE_2: Metric = Metric::RougeN(2);
    pub const ROUGE_L: Metric = Metric::RougeL;

    /// @ai:intent Build a ROUGE-N metric
    /// @ai:pre n >= 1
    /// @ai:effects pure
    pub fn rouge_n(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::UnknownMetric("rouge-0".to_string()));
        }
        Ok(Metric::RougeN(n))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::RougeN(n) => write!(f, "rouge-{}", n),
            Metric::RougeL => write!(f, "rouge-l"),
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    /// @ai:intent Parse "rouge-<n>" or "rouge-l", case-insensitive
    /// @ai:effects pure
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let suffix = normalized
            .strip_prefix("rouge-")
            .ok_or_else(|| Error::UnknownMetric(s.to_string()))?;

        if suffix == "l" {
            return Ok(Metric::RougeL);
        }

        match suffix.parse::<usize>() {
            Ok(n) => Metric::rouge_n(n).map_err(|_| Error::UnknownMetric(s.to_string())),
            Err(_) => Err(Error::UnknownMetric(s.to_string())),
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.to_string()
    }
}

/// @ai:intent Ordered set of enabled metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeSet<Metric>);

impl MetricSet {
    /// @ai:intent Empty selection
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// @ai:intent Parse a comma-separated list such as "rouge-1,rouge-l"
    /// @ai:effects pure
    pub fn parse_list(list: &str) -> Result<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(Metric::from_str)
            .collect()
    }

    pub fn enable(&mut self, metric: Metric) -> &mut Self {
        self.0.insert(metric);
        self
    }

    pub fn disable(&mut self, metric: Metric) -> &mut Self {
        self.0.remove(&metric);
        self
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.0.contains(&metric)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Metric> + '_ {
        self.0.iter().copied()
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        [Metric::ROUGE_1, Metric::ROUGE_2, Metric::ROUGE_L]
            .into_iter()
            .collect()
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// @ai:intent How precision and recall are combined into the F score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FMeasure {
    /// Harmonic mean of precision and recall.
    #[default]
    Symmetric,
    /// Weighted F-beta: beta > 1 favours recall.
    Beta(f64),
}

impl FMeasure {
    /// @ai:intent Combine precision and recall
    /// @ai:post 0 when the weighted denominator is 0
    /// @ai:effects pure
    pub fn combine(&self, precision: f64, recall: f64) -> f64 {
        match *self {
            FMeasure::Symmetric => {
                if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                }
            }
            FMeasure::Beta(beta) => {
                let beta_sq = beta * beta;
                let denominator = recall + beta_sq * precision;
                if denominator > 0.0 {
                    (1.0 + beta_sq) * precision * recall / denominator
                } else {
                    0.0
                }
            }
        }
    }
}

/// @ai:intent Precision, recall and F score for one metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricResult {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricResult {
    /// @ai:intent Result with symmetric F1
    /// @ai:effects pure
    pub fn new(precision: f64, recall: f64) -> Self {
        Self::with_f_measure(precision, recall, FMeasure::Symmetric)
    }

    /// @ai:effects pure
    pub fn with_f_measure(precision: f64, recall: f64, f_measure: FMeasure) -> Self {
        Self {
            precision,
            recall,
            f1: f_measure.combine(precision, recall),
        }
    }

    /// @ai:intent Derive a result from a match count and the two denominators
    /// @ai:post a zero denominator yields 0 for that side
    /// @ai:effects pure
    pub fn from_counts(
        matches: usize,
        hyp_total: usize,
        ref_total: usize,
        f_measure: FMeasure,
    ) -> Self {
        Self::with_f_measure(
            ratio(matches, hyp_total),
            ratio(matches, ref_total),
            f_measure,
        )
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// @ai:intent Configuration shared by pair and corpus scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    #[serde(default)]
    pub metrics: MetricSet,
    /// F-measure used for ROUGE-L; ROUGE-N always uses symmetric F1.
    #[serde(default)]
    pub lcs_f_measure: FMeasure,
    /// Keep per-pair reports in the corpus report.
    #[serde(default)]
    pub retain_pairs: bool,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            metrics: MetricSet::default(),
            lcs_f_measure: FMeasure::Symmetric,
            retain_pairs: false,
        }
    }
}

impl ScoreConfig {
    /// @ai:intent Config scoring only the given metrics
    pub fn with_metrics(metrics: MetricSet) -> Self {
        Self {
            metrics,
            ..Default::default()
        }
    }

    /// @ai:intent Reject configurations that cannot produce a report
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(Error::Input("no metrics selected".to_string()));
        }
        if let FMeasure::Beta(beta) = self.lcs_f_measure {
            if !beta.is_finite() || beta <= 0.0 {
                return Err(Error::Input(format!(
                    "ROUGE-L beta must be a positive finite number, got {}",
                    beta
                )));
            }
        }
        Ok(())
    }
}
