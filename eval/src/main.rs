//! @ai:module:intent CLI for corpus-level ROUGE evaluation
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rouge_eval::{
    config::EvalConfig,
    loader::load_corpus,
    report::{EvalReport, ReportGenerator},
    runner::ParallelRunner,
};
use rouge_scorer::{format_corpus_report, format_pair_report, OutputFormat};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "rouge-eval.toml";

#[derive(Parser)]
#[command(name = "rouge-eval")]
#[command(about = "Score generated summaries against references with ROUGE-1, ROUGE-2 and ROUGE-L")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a hypothesis file against one or more line-aligned reference files
    Score {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Hypothesis file, one summary per line
        #[arg(long)]
        hypotheses: Option<PathBuf>,

        /// Reference file(s); repeat for multi-reference evaluation
        #[arg(short, long = "references")]
        references: Vec<PathBuf>,

        /// Metrics to compute (comma-separated, e.g. rouge-1,rouge-l)
        #[arg(short, long)]
        metrics: Option<String>,

        /// F-beta weight for ROUGE-L (default: symmetric F1)
        #[arg(long)]
        lcs_beta: Option<f64>,

        /// Include per-pair scores in the report
        #[arg(long)]
        per_pair: bool,

        /// Number of scoring workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Abort scoring after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,

        /// Directory for timestamped JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a single hypothesis against one or more references
    Pair {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Hypothesis text
        hypothesis: String,

        /// Reference text(s); the best-matching reference wins per metric
        #[arg(required = true)]
        references: Vec<String>,

        /// Metrics to compute (comma-separated)
        #[arg(short, long)]
        metrics: Option<String>,

        /// F-beta weight for ROUGE-L
        #[arg(long)]
        lcs_beta: Option<f64>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rouge_eval=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            config,
            hypotheses,
            references,
            metrics,
            lcs_beta,
            per_pair,
            workers,
            deadline_secs,
            format,
            output,
        } => {
            score_corpus(ScoreArgs {
                config,
                hypotheses,
                references,
                metrics,
                lcs_beta,
                per_pair,
                workers,
                deadline_secs,
                format,
                output,
            })
            .await
        }
        Commands::Pair {
            config,
            hypothesis,
            references,
            metrics,
            lcs_beta,
            format,
        } => score_pair(config, &hypothesis, &references, metrics, lcs_beta, format),
        Commands::Init { output } => init_config(output),
    }
}

struct ScoreArgs {
    config: Option<PathBuf>,
    hypotheses: Option<PathBuf>,
    references: Vec<PathBuf>,
    metrics: Option<String>,
    lcs_beta: Option<f64>,
    per_pair: bool,
    workers: Option<usize>,
    deadline_secs: Option<u64>,
    format: Format,
    output: Option<PathBuf>,
}

/// @ai:intent Score a corpus from files and report the averages
/// @ai:effects fs:read, fs:write
async fn score_corpus(args: ScoreArgs) -> Result<()> {
    let mut config = load_or_default_config(args.config)?;

    if let Some(metrics) = args.metrics {
        config.scoring.metrics = split_list(&metrics);
    }
    if args.lcs_beta.is_some() {
        config.scoring.lcs_beta = args.lcs_beta;
    }
    config.scoring.per_pair |= args.per_pair;
    if let Some(workers) = args.workers {
        config.run.workers = workers;
    }
    if args.deadline_secs.is_some() {
        config.run.deadline_secs = args.deadline_secs;
    }

    let hypotheses_path = args
        .hypotheses
        .or(config.paths.hypotheses.clone())
        .context("No hypothesis file given (use --hypotheses or [paths] hypotheses)")?;
    let reference_paths = if args.references.is_empty() {
        config.paths.references.clone()
    } else {
        args.references
    };

    let scorer = Arc::new(config.scoring.build_scorer()?);

    let corpus = Arc::new(load_corpus(&hypotheses_path, &reference_paths)?);

    let runner = ParallelRunner::new(
        config.run.workers,
        config.run.deadline_secs.map(Duration::from_secs),
    );
    let scores = runner.run(scorer, corpus).await?;

    println!("{}", format_corpus_report(&scores, args.format.into())?);

    if let Some(results_dir) = args.output.or(config.paths.results_dir.clone()) {
        let report = EvalReport::new(hypotheses_path, reference_paths, scores);
        let output_dir = ReportGenerator::new().generate_all(&report, &results_dir)?;
        tracing::info!("Results saved to {}", output_dir.display());
    }

    Ok(())
}

/// @ai:intent Score one pair given on the command line
/// @ai:effects fs:read
fn score_pair(
    config: Option<PathBuf>,
    hypothesis: &str,
    references: &[String],
    metrics: Option<String>,
    lcs_beta: Option<f64>,
    format: Format,
) -> Result<()> {
    let mut config = load_or_default_config(config)?;
    if let Some(metrics) = metrics {
        config.scoring.metrics = split_list(&metrics);
    }
    if lcs_beta.is_some() {
        config.scoring.lcs_beta = lcs_beta;
    }

    let scorer = config.scoring.build_scorer()?;
    let report = scorer.score_pair(hypothesis, references)?;

    println!("{}", format_pair_report(&report, format.into())?);
    Ok(())
}

/// @ai:intent Write the default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = EvalConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<EvalConfig> {
    match path {
        Some(p) => EvalConfig::load(&p),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG);

            if default_path.exists() {
                tracing::info!("Using configuration from {}", default_path.display());
                EvalConfig::load(&default_path)
            } else {
                Ok(EvalConfig::default())
            }
        }
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
