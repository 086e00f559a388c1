//! @ai:module:intent Configuration structs for the evaluation CLI
//! @ai:module:layer infrastructure
//! @ai:module:public_api EvalConfig, ScoringConfig, TokenizerConfig, RunConfig, PathConfig
//! @ai:module:stateless true

use anyhow::Context;
use rouge_scorer::{FMeasure, MetricSet, PatternTokenizer, ScoreConfig, Scorer, Tokenizer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// @ai:intent Main configuration for an evaluation run
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// @ai:intent Which metrics to compute and how
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
    /// F-beta weight for ROUGE-L; unset means symmetric F1.
    #[serde(default)]
    pub lcs_beta: Option<f64>,
    #[serde(default)]
    pub per_pair: bool,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// @ai:intent Tokenization strategy selection
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Separator regex; unset means split on non-alphanumeric runs.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
}

/// @ai:intent Parallelism and deadline for corpus scoring
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// @ai:intent Input and output locations
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default)]
    pub hypotheses: Option<PathBuf>,
    #[serde(default)]
    pub references: Vec<PathBuf>,
    #[serde(default)]
    pub results_dir: Option<PathBuf>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            lcs_beta: None,
            per_pair: false,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            lowercase: default_lowercase(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            deadline_secs: None,
        }
    }
}

fn default_metrics() -> Vec<String> {
    MetricSet::default().iter().map(|m| m.to_string()).collect()
}

fn default_lowercase() -> bool {
    true
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl EvalConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ScoringConfig {
    /// @ai:intent Translate into the engine's score configuration
    /// @ai:effects pure
    pub fn to_score_config(&self) -> anyhow::Result<ScoreConfig> {
        let metrics = MetricSet::parse_list(&self.metrics.join(","))?;
        let lcs_f_measure = match self.lcs_beta {
            Some(beta) => FMeasure::Beta(beta),
            None => FMeasure::Symmetric,
        };

        let config = ScoreConfig {
            metrics,
            lcs_f_measure,
            retain_pairs: self.per_pair,
        };
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Scorer with the configured metrics and tokenizer
    /// @ai:effects pure
    pub fn build_scorer(&self) -> anyhow::Result<Scorer<Arc<dyn Tokenizer>>> {
        let scorer = Scorer::with_tokenizer(self.tokenizer.build()?, self.to_score_config()?)?;
        Ok(scorer)
    }
}

impl TokenizerConfig {
    /// @ai:intent Build the configured tokenization strategy
    /// @ai:effects pure
    pub fn build(&self) -> anyhow::Result<Arc<dyn Tokenizer>> {
        match &self.pattern {
            Some(pattern) => {
                let tokenizer = PatternTokenizer::new(pattern, self.lowercase)
                    .with_context(|| format!("Invalid tokenizer pattern: {}", pattern))?;
                tracing::debug!("Splitting tokens on /{}/", tokenizer.pattern());
                Ok(Arc::new(tokenizer))
            }
            None => Ok(Arc::new(rouge_scorer::DefaultTokenizer)),
        }
    }
}
