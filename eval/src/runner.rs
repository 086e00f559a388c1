//! @ai:module:intent Parallel corpus scoring with an optional overall deadline
//! @ai:module:layer application
//! @ai:module:public_api ParallelRunner, RunError
//! @ai:module:stateless false

use crate::loader::EvalCorpus;
use rouge_scorer::{check_alignment, CorpusAccumulator, CorpusReport, Scorer, Tokenizer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

/// @ai:intent Failures of a parallel scoring run
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scoring(#[from] rouge_scorer::Error),

    #[error("Deadline of {deadline:?} exceeded after scoring {completed} of {total} pairs")]
    DeadlineExceeded {
        deadline: Duration,
        completed: usize,
        total: usize,
    },

    #[error("Scoring worker failed: {0}")]
    Worker(String),
}

/// @ai:intent Partitions pairs across blocking workers and merges their sums
#[derive(Debug, Clone)]
pub struct ParallelRunner {
    workers: usize,
    deadline: Option<Duration>,
}

impl ParallelRunner {
    /// @ai:intent Create a runner
    /// @ai:pre workers >= 1 (0 is treated as 1)
    /// @ai:effects pure
    pub fn new(workers: usize, deadline: Option<Duration>) -> Self {
        Self {
            workers: workers.max(1),
            deadline,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// @ai:intent Score the whole corpus, aborting when the deadline passes
    /// @ai:pre corpus is aligned and non-empty
    /// @ai:effects spawns blocking tasks, time
    pub async fn run<T>(
        &self,
        scorer: Arc<Scorer<T>>,
        corpus: Arc<EvalCorpus>,
    ) -> Result<CorpusReport, RunError>
    where
        T: Tokenizer + 'static,
    {
        check_alignment(corpus.hypotheses.len(), corpus.references.len())?;

        let total = corpus.len();
        let cancelled = Arc::new(AtomicBool::new(false));
        let completed = Arc::new(AtomicUsize::new(0));
        let chunk_size = total.div_ceil(self.workers);

        tracing::info!(
            "Scoring {} pairs with {} workers",
            total,
            self.workers.min(total)
        );

        let mut tasks = JoinSet::new();
        for start in (0..total).step_by(chunk_size) {
            let end = (start + chunk_size).min(total);
            let scorer = Arc::clone(&scorer);
            let corpus = Arc::clone(&corpus);
            let cancelled = Arc::clone(&cancelled);
            let completed = Arc::clone(&completed);

            tasks.spawn_blocking(move || {
                score_chunk(&*scorer, &*corpus, start..end, &cancelled, &completed)
            });
        }

        let collect = collect_partials(&mut tasks, scorer.accumulator(), &cancelled);

        let accumulator = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, collect).await {
                Ok(result) => result?,
                Err(_) => {
                    cancelled.store(true, Ordering::Relaxed);
                    tasks.abort_all();
                    let completed = completed.load(Ordering::Relaxed);
                    tracing::warn!(
                        "Deadline exceeded: {} of {} pairs scored",
                        completed,
                        total
                    );
                    return Err(RunError::DeadlineExceeded {
                        deadline,
                        completed,
                        total,
                    });
                }
            },
            None => collect.await?,
        };

        Ok(accumulator.finish()?)
    }
}

/// @ai:intent Merge worker results as they finish
/// @ai:post on the first failure the remaining workers are told to stop
/// @ai:effects state:write
async fn collect_partials(
    tasks: &mut JoinSet<Result<Option<CorpusAccumulator>, rouge_scorer::Error>>,
    mut accumulator: CorpusAccumulator,
    cancelled: &AtomicBool,
) -> Result<CorpusAccumulator, RunError> {
    while let Some(joined) = tasks.join_next().await {
        let partial = match joined {
            Ok(Ok(partial)) => partial,
            Ok(Err(e)) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(e.into());
            }
            Err(e) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(RunError::Worker(e.to_string()));
            }
        };
        if let Some(partial) = partial {
            accumulator.merge(partial);
        }
    }
    Ok(accumulator)
}

/// @ai:intent Score one contiguous range, stopping between pairs once cancelled
/// @ai:post returns None when cancelled before finishing
/// @ai:effects state:write
fn score_chunk<T: Tokenizer>(
    scorer: &Scorer<T>,
    corpus: &EvalCorpus,
    range: std::ops::Range<usize>,
    cancelled: &AtomicBool,
    completed: &AtomicUsize,
) -> Result<Option<CorpusAccumulator>, rouge_scorer::Error> {
    if cancelled.load(Ordering::Relaxed) {
        return Ok(None);
    }

    let mut accumulator = scorer.accumulator();
    let finished = scorer.score_range_multi_while(
        &corpus.hypotheses,
        &corpus.references,
        range,
        &mut accumulator,
        || {
            completed.fetch_add(1, Ordering::Relaxed);
            !cancelled.load(Ordering::Relaxed)
        },
    )?;

    Ok(finished.then_some(accumulator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rouge_scorer::{DefaultTokenizer, Metric, ScoreConfig};

    fn corpus(pairs: Vec<(&str, Vec<&str>)>) -> Arc<EvalCorpus> {
        Arc::new(EvalCorpus {
            hypotheses: pairs.iter().map(|(h, _)| h.to_string()).collect(),
            references: pairs
                .iter()
                .map(|(_, refs)| refs.iter().map(|r| r.to_string()).collect())
                .collect(),
        })
    }

    fn sample_corpus(size: usize) -> Arc<EvalCorpus> {
        let texts = [
            ("the cat sat on the mat", "the cat sat on the mat"),
            ("the cat", "the dog"),
            ("", "the cat sat"),
            ("a quick brown fox", "the quick brown fox jumps"),
            ("police killed the gunman", "the gunman was shot by police"),
        ];
        Arc::new(EvalCorpus {
            hypotheses: (0..size).map(|i| texts[i % texts.len()].0.to_string()).collect(),
            references: (0..size)
                .map(|i| vec![texts[i % texts.len()].1.to_string()])
                .collect(),
        })
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let config = ScoreConfig {
            retain_pairs: true,
            ..Default::default()
        };
        let scorer = Arc::new(Scorer::with_config(config).unwrap());
        let corpus = sample_corpus(103);

        let parallel = ParallelRunner::new(4, None)
            .run(Arc::clone(&scorer), Arc::clone(&corpus))
            .await
            .unwrap();
        let sequential = scorer
            .score_corpus_multi(&corpus.hypotheses, &corpus.references)
            .unwrap();

        assert_eq!(parallel.pair_count, 103);
        assert_eq!(parallel.pairs, sequential.pairs);
        for (metric, expected) in &sequential.averages {
            let actual = parallel.get(*metric).unwrap();
            assert!((actual.precision - expected.precision).abs() < 1e-9);
            assert!((actual.recall - expected.recall).abs() < 1e-9);
            assert!((actual.f1 - expected.f1).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_more_workers_than_pairs() {
        let scorer = Arc::new(Scorer::new());
        let report = ParallelRunner::new(16, None)
            .run(scorer, corpus(vec![("the cat", vec!["the dog"])]))
            .await
            .unwrap();

        assert_eq!(report.pair_count, 1);
        assert!((report.get(Metric::ROUGE_1).unwrap().f1 - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_multi_reference_run() {
        let scorer = Arc::new(Scorer::new());
        let report = ParallelRunner::new(2, None)
            .run(
                scorer,
                corpus(vec![("a quick fox", vec!["a slow fox", "a quick fox jumps"])]),
            )
            .await
            .unwrap();

        assert!((report.get(Metric::ROUGE_1).unwrap().recall - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_corpus_fails() {
        let scorer = Arc::new(Scorer::new());
        let err = ParallelRunner::new(2, None)
            .run(scorer, corpus(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Scoring(rouge_scorer::Error::EmptyCorpus)
        ));
    }

    #[tokio::test]
    async fn test_misaligned_corpus_fails() {
        let scorer = Arc::new(Scorer::new());
        let corpus = Arc::new(EvalCorpus {
            hypotheses: vec!["a".to_string(), "b".to_string()],
            references: vec![vec!["a".to_string()]],
        });
        let err = ParallelRunner::new(2, None)
            .run(scorer, corpus)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Scoring(rouge_scorer::Error::Alignment { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_reference_set_fails() {
        let scorer = Arc::new(Scorer::new());
        let err = ParallelRunner::new(1, None)
            .run(scorer, corpus(vec![("a", vec![])]))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Scoring(rouge_scorer::Error::Input(_))));
    }

    struct SlowTokenizer;

    impl Tokenizer for SlowTokenizer {
        fn split(&self, text: &str) -> Vec<String> {
            std::thread::sleep(Duration::from_millis(20));
            DefaultTokenizer.split(text)
        }
    }

    #[tokio::test]
    async fn test_deadline_aborts_run() {
        let scorer = Arc::new(Scorer::with_tokenizer(SlowTokenizer, ScoreConfig::default()).unwrap());
        // Distinct texts so the per-call token cache cannot short-circuit the work
        let pairs: Vec<(String, String)> = (0..200)
            .map(|i| (format!("hyp {}", i), format!("ref {}", i)))
            .collect();
        let corpus = Arc::new(EvalCorpus {
            hypotheses: pairs.iter().map(|(h, _)| h.clone()).collect(),
            references: pairs.iter().map(|(_, r)| vec![r.clone()]).collect(),
        });

        let err = ParallelRunner::new(2, Some(Duration::from_millis(100)))
            .run(scorer, corpus)
            .await
            .unwrap_err();

        match err {
            RunError::DeadlineExceeded {
                completed, total, ..
            } => {
                assert_eq!(total, 200);
                assert!(completed < total);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct CountingTokenizer(Arc<AtomicUsize>);

    impl Tokenizer for CountingTokenizer {
        fn split(&self, text: &str) -> Vec<String> {
            self.0.fetch_add(1, Ordering::Relaxed);
            DefaultTokenizer.split(text)
        }
    }

    #[tokio::test]
    async fn test_chunk_shares_one_token_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tokenizer = CountingTokenizer(Arc::clone(&calls));
        let scorer = Arc::new(Scorer::with_tokenizer(tokenizer, ScoreConfig::default()).unwrap());
        let corpus = corpus(vec![("the cat", vec!["the dog"]); 64]);

        let report = ParallelRunner::new(1, None)
            .run(scorer, corpus)
            .await
            .unwrap();

        assert_eq!(report.pair_count, 64);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_cancelled_chunk_stops_after_current_pair() {
        let scorer = Scorer::new();
        let corpus = sample_corpus(20);
        let cancelled = AtomicBool::new(true);
        let completed = AtomicUsize::new(0);

        let result = score_chunk(&scorer, &corpus, 0..20, &cancelled, &completed).unwrap();
        assert!(result.is_none());
        assert_eq!(completed.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_failed_worker_cancels_the_rest() {
        let cancelled = AtomicBool::new(false);
        let mut tasks = JoinSet::new();
        tasks.spawn_blocking(|| Err(rouge_scorer::Error::Input("broken pair".to_string())));

        let err = collect_partials(&mut tasks, CorpusAccumulator::new(false), &cancelled)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Scoring(rouge_scorer::Error::Input(_))));
        assert!(cancelled.load(Ordering::Relaxed));
    }

    #[test]
    fn test_zero_workers_becomes_one() {
        assert_eq!(ParallelRunner::new(0, None).workers(), 1);
    }
}
