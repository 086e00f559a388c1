//! @ai:module:intent Read line-aligned hypothesis and reference files
//! @ai:module:layer infrastructure
//! @ai:module:public_api read_lines, load_corpus, EvalCorpus
//! @ai:module:stateless true

use anyhow::{Context, Result};
use rouge_scorer::check_alignment;
use std::path::Path;

/// @ai:intent Hypotheses with the aligned reference set for each line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalCorpus {
    pub hypotheses: Vec<String>,
    pub references: Vec<Vec<String>>,
}

impl EvalCorpus {
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }
}

/// @ai:intent Split file content into items, one per line
/// @ai:post only the line terminator ("\n" or "\r\n") is removed
/// @ai:effects pure
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .split_inclusive('\n')
        .map(|line| {
            let line = line.strip_suffix('\n').unwrap_or(line);
            line.strip_suffix('\r').unwrap_or(line).to_string()
        })
        .collect()
}

/// @ai:intent Read a file as one item per line
/// @ai:effects fs:read
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(split_lines(&content))
}

/// @ai:intent Load a hypothesis file and one or more aligned reference files
/// @ai:pre every reference file has as many lines as the hypothesis file
/// @ai:effects fs:read
pub fn load_corpus(
    hypotheses_path: &Path,
    reference_paths: &[impl AsRef<Path>],
) -> Result<EvalCorpus> {
    if reference_paths.is_empty() {
        anyhow::bail!("At least one reference file is required");
    }

    let hypotheses = read_lines(hypotheses_path)?;
    tracing::info!(
        "Loaded {} hypotheses from {}",
        hypotheses.len(),
        hypotheses_path.display()
    );

    let mut references: Vec<Vec<String>> =
        vec![Vec::with_capacity(reference_paths.len()); hypotheses.len()];

    for path in reference_paths {
        let path = path.as_ref();
        let lines = read_lines(path)?;

        check_alignment(hypotheses.len(), lines.len()).with_context(|| {
            format!(
                "{} is not aligned with {}",
                path.display(),
                hypotheses_path.display()
            )
        })?;

        for (set, line) in references.iter_mut().zip(lines) {
            set.push(line);
        }
        tracing::info!("Loaded references from {}", path.display());
    }

    Ok(EvalCorpus {
        hypotheses,
        references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_split_lines_strips_terminators_only() {
        assert_eq!(
            split_lines("first line\nsecond  \r\nlast"),
            vec!["first line", "second  ", "last"]
        );
    }

    #[test]
    fn test_split_lines_keeps_blank_lines() {
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_load_corpus_multi_reference() {
        let temp = TempDir::new().unwrap();
        let hyp = temp.path().join("hyp.txt");
        let ref_a = temp.path().join("ref_a.txt");
        let ref_b = temp.path().join("ref_b.txt");
        std::fs::write(&hyp, "a quick fox\nthe cat\n").unwrap();
        std::fs::write(&ref_a, "a slow fox\nthe dog\n").unwrap();
        std::fs::write(&ref_b, "a quick fox jumps\nthe cat sat\n").unwrap();

        let corpus = load_corpus(&hyp, &[&ref_a, &ref_b]).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(
            corpus.references[0],
            vec!["a slow fox".to_string(), "a quick fox jumps".to_string()]
        );
    }

    #[test]
    fn test_load_corpus_rejects_misaligned_file() {
        let temp = TempDir::new().unwrap();
        let hyp = temp.path().join("hyp.txt");
        let reference = temp.path().join("ref.txt");
        std::fs::write(&hyp, "one\ntwo\nthree\n").unwrap();
        std::fs::write(&reference, "one\ntwo\n").unwrap();

        let err = load_corpus(&hyp, &[&reference]).unwrap_err();
        let alignment = err.downcast_ref::<rouge_scorer::Error>();
        assert!(matches!(
            alignment,
            Some(rouge_scorer::Error::Alignment {
                hypotheses: 3,
                references: 2
            })
        ));
    }

    #[test]
    fn test_load_corpus_rejects_empty_files() {
        let temp = TempDir::new().unwrap();
        let hyp = temp.path().join("hyp.txt");
        let reference = temp.path().join("ref.txt");
        std::fs::write(&hyp, "").unwrap();
        std::fs::write(&reference, "").unwrap();

        let err = load_corpus(&hyp, &[&reference]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<rouge_scorer::Error>(),
            Some(rouge_scorer::Error::EmptyCorpus)
        ));
    }

    #[test]
    fn test_load_corpus_requires_reference() {
        let temp = TempDir::new().unwrap();
        let hyp = temp.path().join("hyp.txt");
        std::fs::write(&hyp, "x\n").unwrap();
        let none: [&Path; 0] = [];
        assert!(load_corpus(&hyp, &none).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_lines(Path::new("/nonexistent/hyp.txt")).unwrap_err();
        assert!(err.to_string().contains("hyp.txt"));
    }
}
