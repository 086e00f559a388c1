//! @ai:module:intent JSON report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter, EvalReport
//! @ai:module:stateless true

use anyhow::Result;
use rouge_scorer::CorpusReport;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent A corpus report with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub timestamp: String,
    pub hypotheses: PathBuf,
    pub references: Vec<PathBuf>,
    pub scores: CorpusReport,
}

impl EvalReport {
    /// @ai:intent Stamp a corpus report with the current time and its inputs
    /// @ai:effects time
    pub fn new(hypotheses: PathBuf, references: Vec<PathBuf>, scores: CorpusReport) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            hypotheses,
            references,
            scores,
        }
    }
}

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Generate JSON report from results
    fn generate(&self, report: &EvalReport, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates JSON reports from evaluation results
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Generate JSON report to file
    /// @ai:effects fs:write
    fn generate(&self, report: &EvalReport, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}
