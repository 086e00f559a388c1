//! @ai:module:intent Format score reports for different outputs (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_pair_report, format_corpus_report, to_json
//! @ai:module:depends_on scorer, corpus
//! @ai:module:stateless true

use crate::corpus::CorpusReport;
use crate::error::Result;
use crate::metric::{Metric, MetricResult};
use crate::scorer::PairReport;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format a corpus report as a string
/// @ai:effects pure
pub fn format_corpus_report(report: &CorpusReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => Ok(format_corpus_report_text(report)),
    }
}

/// @ai:intent Format a single pair report as a string
/// @ai:effects pure
pub fn format_pair_report(report: &PairReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => Ok(score_table(report.iter())),
    }
}

/// @ai:intent Format a corpus report as human-readable text
/// @ai:effects pure
fn format_corpus_report_text(report: &CorpusReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({} pairs)\n\n",
        "ROUGE scores".bold(),
        report.pair_count
    ));
    output.push_str(&score_table(report.averages.iter().map(|(m, r)| (*m, r))));

    if let Some(pairs) = &report.pairs {
        output.push_str(&format!("\n{}\n", "Per-pair F1".bold()));

        for (index, pair) in pairs.iter().enumerate() {
            let scores: Vec<String> = pair
                .iter()
                .map(|(metric, result)| format!("{}={:.4}", metric, result.f1))
                .collect();
            output.push_str(&format!(
                "  {} {}\n",
                format!("#{}", index + 1).dimmed(),
                scores.join(" ")
            ));
        }
    }

    output
}

fn score_table<'a>(rows: impl Iterator<Item = (Metric, &'a MetricResult)>) -> String {
    let mut output = format!(
        "{:<10} {:>10} {:>10} {:>10}\n",
        "", "Precision", "Recall", "F1"
    );
    output.push_str(&format!("{}\n", "-".repeat(43)));

    for (metric, result) in rows {
        output.push_str(&format!(
            "{:<10} {:>10.4} {:>10.4} {:>10}\n",
            metric.to_string(),
            result.precision,
            result.recall,
            format!("{:.4}", result.f1).green()
        ));
    }

    output
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::ScoreConfig;
    use crate::scorer::Scorer;

    fn sample_report(retain_pairs: bool) -> CorpusReport {
        let scorer = Scorer::with_config(ScoreConfig {
            retain_pairs,
            ..Default::default()
        })
        .unwrap();
        scorer
            .score_corpus(&["the cat", "a b"], &["the dog", "a b"])
            .unwrap()
    }

    #[test]
    fn test_text_report_lists_every_metric() {
        let text = format_corpus_report(&sample_report(false), OutputFormat::Text).unwrap();
        assert!(text.contains("2 pairs"));
        assert!(text.contains("rouge-1"));
        assert!(text.contains("rouge-2"));
        assert!(text.contains("rouge-l"));
        assert!(text.contains("0.7500"));
        assert!(!text.contains("Per-pair"));
    }

    #[test]
    fn test_text_report_with_pairs() {
        let text = format_corpus_report(&sample_report(true), OutputFormat::Text).unwrap();
        assert!(text.contains("Per-pair"));
        assert!(text.contains("rouge-1=0.5000"));
        assert!(text.contains("rouge-1=1.0000"));
    }

    #[test]
    fn test_json_report_parses_back() {
        let report = sample_report(true);
        let json = format_corpus_report(&report, OutputFormat::Json).unwrap();
        let parsed: CorpusReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_pair_report_pretty_json() {
        let pair = Scorer::new().score_pair("a b", "a b").unwrap();
        let json = format_pair_report(&pair, OutputFormat::JsonPretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"rouge-l\""));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_json_failure_is_reported() {
        let err = to_json(&Unserializable, true).unwrap_err();
        assert!(matches!(err, crate::error::Error::Json(_)));
        assert!(err.to_string().contains("cannot serialize"));
    }
}
