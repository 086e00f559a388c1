//! @ai:module:intent Report generation for evaluation results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, EvalReport

pub mod json_report;

pub use json_report::{EvalReport, JsonReporter, JsonReporterTrait};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// @ai:intent Writes reports into a timestamped results directory
pub struct ReportGenerator {
    json: JsonReporter,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
        }
    }

    /// @ai:intent Write all reports into a fresh subdirectory of results_dir
    /// @ai:post returns the directory the reports were written to
    /// @ai:effects fs:write
    pub fn generate_all(&self, report: &EvalReport, results_dir: &Path) -> Result<PathBuf> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let output_dir = results_dir.join(timestamp.to_string());
        std::fs::create_dir_all(&output_dir)?;

        self.json.generate(report, &output_dir.join("results.json"))?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(output_dir)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
