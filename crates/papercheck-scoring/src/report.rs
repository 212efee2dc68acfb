//! Score one dataset row end to end.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::ScoringError;
use crate::chat::ChatCompletion;
use crate::grammar::{GrammarCorrector, grammar_check};
use crate::structure::structure_check;
use crate::style::style_check;

/// One row of a preprocessed paper dataset (JSON Lines).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaperRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub text: String,
}

/// Scores for one paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub grammar_diff_count: usize,
    pub style_score: f64,
    pub section_score: f64,
    pub flow_score: f64,
    pub argument_score: f64,
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grammar Score: {}, Style Score: {}, Section Completeness: {}, Logical Flow: {}, Argument Strength: {}",
            self.grammar_diff_count,
            self.style_score,
            self.section_score,
            self.flow_score,
            self.argument_score
        )
    }
}

/// Read row `row` (0-based, blank lines skipped) from a JSON Lines file.
pub fn load_record(path: &Path, row: usize) -> Result<PaperRecord, ScoringError> {
    let content = std::fs::read_to_string(path)?;
    let mut rows = 0;
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if rows == row {
            return serde_json::from_str(line).map_err(|e| {
                ScoringError::Dataset(format!("{}:{}: {e}", path.display(), line_no + 1))
            });
        }
        rows += 1;
    }
    Err(ScoringError::Dataset(format!(
        "row {row} out of range: {} has {rows} rows",
        path.display()
    )))
}

/// Grammar on the abstract, then style and structure on the full text.
///
/// Calls run one after another and the first failure aborts the report.
pub async fn score_paper(
    record: &PaperRecord,
    corrector: &dyn GrammarCorrector,
    chat: &dyn ChatCompletion,
) -> Result<ScoreReport, ScoringError> {
    let started = Instant::now();
    tracing::info!(id = record.id.as_deref().unwrap_or("-"), "starting paper analysis");

    tracing::info!(step = "grammar", "checking grammar");
    let grammar = grammar_check(corrector, &record.abstract_text).await?;

    tracing::info!(step = "style", "checking style");
    let style_score = style_check(chat, &record.text).await?;

    tracing::info!(step = "structure", "checking structure");
    let structure = structure_check(chat, &record.text).await?;

    tracing::info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "paper analysis finished"
    );

    Ok(ScoreReport {
        grammar_diff_count: grammar.differences,
        style_score,
        section_score: structure.section_completeness,
        flow_score: structure.logical_flow,
        argument_score: structure.argument_strength,
    })
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::io::Write;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;

    /// Answers style prompts and structure prompts with different canned replies.
    struct ScriptedChat {
        prompts: Mutex<Vec<u32>>,
    }

    impl ChatCompletion for ScriptedChat {
        fn complete<'a>(
            &'a self,
            _prompt: &'a str,
            max_tokens: u32,
        ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(max_tokens);
                Ok(if max_tokens == 20 {
                    r#"{"style_score": 8}"#.to_string()
                } else {
                    r#"{"section_completeness": 7, "logical_flow": 6.5, "argument_strength": 5}"#
                        .to_string()
                })
            })
        }
    }

    struct Echo;

    impl GrammarCorrector for Echo {
        fn correct<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
            Box::pin(async move { Ok(text.replace("are", "is")) })
        }
    }

    struct Down;

    impl GrammarCorrector for Down {
        fn correct<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
            Box::pin(async move { Err(ScoringError::NotConfigured("grammar service")) })
        }
    }

    fn record() -> PaperRecord {
        PaperRecord {
            id: Some("p1".into()),
            title: None,
            abstract_text: "This are a paper.".into(),
            text: "Introduction. Methods. Results.".into(),
        }
    }

    #[tokio::test]
    async fn runs_grammar_then_style_then_structure() {
        let chat = ScriptedChat {
            prompts: Mutex::new(Vec::new()),
        };
        let report = score_paper(&record(), &Echo, &chat).await.unwrap();

        assert_eq!(
            report,
            ScoreReport {
                grammar_diff_count: 1,
                style_score: 8.0,
                section_score: 7.0,
                flow_score: 6.5,
                argument_score: 5.0,
            }
        );
        assert_eq!(*chat.prompts.lock().unwrap(), vec![20, 100]);
    }

    #[tokio::test]
    async fn grammar_failure_stops_the_report() {
        let chat = ScriptedChat {
            prompts: Mutex::new(Vec::new()),
        };
        let err = score_paper(&record(), &Down, &chat).await.unwrap_err();
        assert!(matches!(err, ScoringError::NotConfigured(_)));
        assert!(chat.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn report_line_matches_driver_output() {
        let report = ScoreReport {
            grammar_diff_count: 3,
            style_score: 4.5,
            section_score: 9.0,
            flow_score: 9.5,
            argument_score: 9.0,
        };
        assert_eq!(
            report.to_string(),
            "Grammar Score: 3, Style Score: 4.5, Section Completeness: 9, Logical Flow: 9.5, Argument Strength: 9"
        );
    }

    #[test]
    fn load_record_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"abstract": "A0", "text": "T0"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id": "x", "title": "Second", "abstract": "A1", "text": "T1"}}"#).unwrap();

        let first = load_record(file.path(), 0).unwrap();
        assert_eq!(first.abstract_text, "A0");
        assert_eq!(first.id, None);

        let second = load_record(file.path(), 1).unwrap();
        assert_eq!(second.title.as_deref(), Some("Second"));
        assert_eq!(second.text, "T1");
    }

    #[test]
    fn load_record_reports_range_and_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"abstract": "A0", "text": "T0"}}"#).unwrap();
        writeln!(file, r#"{{"abstract": "missing text"}}"#).unwrap();

        let err = load_record(file.path(), 5).unwrap_err().to_string();
        assert!(err.contains("row 5 out of range"), "{err}");
        assert!(err.contains("has 2 rows"), "{err}");

        let err = load_record(file.path(), 1).unwrap_err().to_string();
        assert!(err.contains(":2:"), "{err}");
    }
}
