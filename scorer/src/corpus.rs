//! @ai:module:intent Corpus-level scoring and mean aggregation of pair reports
//! @ai:module:layer application
//! @ai:module:public_api CorpusReport, CorpusAccumulator, check_alignment
//! @ai:module:depends_on scorer, metric
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::metric::{Metric, MetricResult};
use crate::scorer::{PairReport, Scorer};
use crate::tokenizer::{Token, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// @ai:intent Mean scores over a corpus, with optional per-pair detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub pair_count: usize,
    pub averages: BTreeMap<Metric, MetricResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<PairReport>>,
}

impl CorpusReport {
    pub fn get(&self, metric: Metric) -> Option<&MetricResult> {
        self.averages.get(&metric)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FieldSums {
    precision: f64,
    recall: f64,
    f1: f64,
    count: usize,
}

/// @ai:intent Running per-metric sums that can be merged in any order
#[derive(Debug, Clone, Default)]
pub struct CorpusAccumulator {
    sums: BTreeMap<Metric, FieldSums>,
    pair_count: usize,
    pairs: Option<Vec<(usize, PairReport)>>,
}

impl CorpusAccumulator {
    /// @ai:intent Create an accumulator, optionally retaining pair reports
    /// @ai:effects pure
    pub fn new(retain_pairs: bool) -> Self {
        Self {
            sums: BTreeMap::new(),
            pair_count: 0,
            pairs: retain_pairs.then(Vec::new),
        }
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    /// @ai:intent Fold one pair report in, tagged with its corpus index
    /// @ai:effects state:write
    pub fn push(&mut self, index: usize, report: PairReport) {
        for (metric, result) in report.iter() {
            let sums = self.sums.entry(metric).or_default();
            sums.precision += result.precision;
            sums.recall += result.recall;
            sums.f1 += result.f1;
            sums.count += 1;
        }
        self.pair_count += 1;

        if let Some(pairs) = self.pairs.as_mut() {
            pairs.push((index, report));
        }
    }

    /// @ai:intent Combine another partial accumulator into this one
    /// @ai:effects state:write
    pub fn merge(&mut self, other: CorpusAccumulator) {
        for (metric, theirs) in other.sums {
            let ours = self.sums.entry(metric).or_default();
            ours.precision += theirs.precision;
            ours.recall += theirs.recall;
            ours.f1 += theirs.f1;
            ours.count += theirs.count;
        }
        self.pair_count += other.pair_count;

        if let Some(theirs) = other.pairs {
            self.pairs.get_or_insert_with(Vec::new).extend(theirs);
        }
    }

    /// @ai:intent Divide the sums into per-field means
    /// @ai:pre at least one pair was pushed
    /// @ai:effects pure
    pub fn finish(self) -> Result<CorpusReport> {
        if self.pair_count == 0 {
            return Err(Error::EmptyCorpus);
        }

        let averages = self
            .sums
            .into_iter()
            .map(|(metric, sums)| {
                let n = sums.count as f64;
                let mean = MetricResult {
                    precision: sums.precision / n,
                    recall: sums.recall / n,
                    f1: sums.f1 / n,
                };
                (metric, mean)
            })
            .collect();

        let pairs = self.pairs.map(|mut pairs| {
            pairs.sort_by_key(|(index, _)| *index);
            pairs.into_iter().map(|(_, report)| report).collect()
        });

        Ok(CorpusReport {
            pair_count: self.pair_count,
            averages,
            pairs,
        })
    }
}

/// @ai:intent Reject corpora that are misaligned or empty
/// @ai:effects pure
pub fn check_alignment(hypotheses: usize, references: usize) -> Result<()> {
    if hypotheses != references {
        tracing::warn!(
            "Hypothesis/reference count mismatch: {} vs {}",
            hypotheses,
            references
        );
        return Err(Error::Alignment {
            hypotheses,
            references,
        });
    }
    if hypotheses == 0 {
        return Err(Error::EmptyCorpus);
    }
    Ok(())
}

/// Tokenizations memoized for the duration of one corpus call, keyed by exact text.
struct TokenCache<'s, 't, T: Tokenizer> {
    scorer: &'s Scorer<T>,
    cache: HashMap<&'t str, Rc<[Token]>>,
}

impl<'s, 't, T: Tokenizer> TokenCache<'s, 't, T> {
    fn new(scorer: &'s Scorer<T>) -> Self {
        Self {
            scorer,
            cache: HashMap::new(),
        }
    }

    fn tokens(&mut self, text: &'t str) -> Rc<[Token]> {
        let scorer = self.scorer;
        self.cache
            .entry(text)
            .or_insert_with(|| scorer.tokenize(text).into())
            .clone()
    }
}

impl<T: Tokenizer> Scorer<T> {
    /// @ai:intent Score aligned hypothesis/reference corpora and average per field
    /// @ai:pre hypotheses.len() == references.len() > 0
    /// @ai:effects pure
    pub fn score_corpus<H, R>(&self, hypotheses: &[H], references: &[R]) -> Result<CorpusReport>
    where
        H: AsRef<str>,
        R: AsRef<str>,
    {
        check_alignment(hypotheses.len(), references.len())?;
        let mut accumulator = self.accumulator();
        self.score_range(hypotheses, references, 0..hypotheses.len(), &mut accumulator)?;
        accumulator.finish()
    }

    /// @ai:intent Score a corpus where each hypothesis has a set of references
    /// @ai:pre every reference set is non-empty
    /// @ai:effects pure
    pub fn score_corpus_multi<H, R>(
        &self,
        hypotheses: &[H],
        references: &[Vec<R>],
    ) -> Result<CorpusReport>
    where
        H: AsRef<str>,
        R: AsRef<str>,
    {
        check_alignment(hypotheses.len(), references.len())?;
        let mut accumulator = self.accumulator();
        self.score_range_multi(hypotheses, references, 0..hypotheses.len(), &mut accumulator)?;
        accumulator.finish()
    }

    /// @ai:intent Empty accumulator honouring this scorer's retain_pairs setting
    pub fn accumulator(&self) -> CorpusAccumulator {
        CorpusAccumulator::new(self.config().retain_pairs)
    }

    /// @ai:intent Score the pairs at the given indices into an accumulator
    /// @ai:pre indices are in bounds for both slices (checked)
    /// @ai:effects state:write
    pub fn score_range<H, R>(
        &self,
        hypotheses: &[H],
        references: &[R],
        indices: std::ops::Range<usize>,
        accumulator: &mut CorpusAccumulator,
    ) -> Result<()>
    where
        H: AsRef<str>,
        R: AsRef<str>,
    {
        check_range(hypotheses.len(), references.len(), &indices)?;
        let mut cache = TokenCache::new(self);

        for index in indices {
            let hyp = cache.tokens(hypotheses[index].as_ref());
            let reference = cache.tokens(references[index].as_ref());
            let report = self.score_tokens(&hyp[..], &[&reference[..]])?;
            accumulator.push(index, report);
        }

        tracing::debug!("Scored {} pairs", accumulator.pair_count());
        Ok(())
    }

    /// @ai:intent Multi-reference variant of score_range
    /// @ai:pre indices are in bounds for both slices (checked)
    /// @ai:effects state:write
    pub fn score_range_multi<H, R>(
        &self,
        hypotheses: &[H],
        references: &[Vec<R>],
        indices: std::ops::Range<usize>,
        accumulator: &mut CorpusAccumulator,
    ) -> Result<()>
    where
        H: AsRef<str>,
        R: AsRef<str>,
    {
        self.score_range_multi_while(hypotheses, references, indices, accumulator, || true)
            .map(|_| ())
    }

    /// @ai:intent Score a range with one token cache, asking `proceed` after every pair
    /// @ai:post Ok(false) when `proceed` stopped the range before its last pair
    /// @ai:effects state:write
    pub fn score_range_multi_while<H, R, F>(
        &self,
        hypotheses: &[H],
        references: &[Vec<R>],
        indices: std::ops::Range<usize>,
        accumulator: &mut CorpusAccumulator,
        mut proceed: F,
    ) -> Result<bool>
    where
        H: AsRef<str>,
        R: AsRef<str>,
        F: FnMut() -> bool,
    {
        check_range(hypotheses.len(), references.len(), &indices)?;
        let mut cache = TokenCache::new(self);
        let last = indices.end;

        for index in indices {
            if references[index].is_empty() {
                return Err(Error::Input(format!(
                    "reference set for pair {} is empty",
                    index
                )));
            }

            let hyp = cache.tokens(hypotheses[index].as_ref());
            let refs: Vec<Rc<[Token]>> = references[index]
                .iter()
                .map(|r| cache.tokens(r.as_ref()))
                .collect();
            let ref_slices: Vec<&[Token]> = refs.iter().map(|r| &r[..]).collect();

            let report = self.score_tokens(&hyp[..], &ref_slices)?;
            accumulator.push(index, report);

            if !proceed() && index + 1 < last {
                tracing::debug!("Stopped after pair {}", index);
                return Ok(false);
            }
        }

        tracing::debug!("Scored {} multi-reference pairs", accumulator.pair_count());
        Ok(true)
    }
}

/// Both slices must have the same length and cover the whole range.
fn check_range(hypotheses: usize, references: usize, indices: &std::ops::Range<usize>) -> Result<()> {
    if hypotheses != references {
        return Err(Error::Alignment {
            hypotheses,
            references,
        });
    }
    if indices.end > hypotheses {
        return Err(Error::Input(format!(
            "pair range {}..{} is out of bounds for {} pairs",
            indices.start, indices.end, hypotheses
        )));
    }
    Ok(())
}
