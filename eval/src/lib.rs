//! @ai:module:intent ROUGE corpus evaluation library
//! @ai:module:layer application
//! @ai:module:public_api config, loader, runner, report

pub mod config;
pub mod loader;
pub mod report;
pub mod runner;

pub use config::EvalConfig;
pub use loader::{load_corpus, read_lines, EvalCorpus};
pub use report::{EvalReport, ReportGenerator};
pub use runner::{ParallelRunner, RunError};
