//! Structure scores from a chat model.

use serde::{Deserialize, Serialize};

use crate::chat::ChatCompletion;
use crate::{ScoringError, parse_reply};

const MAX_TOKENS: u32 = 100;

const PROMPT: &str = r#"Evaluate the structure of the following academic paper text according to the following criteria rigorously:

1. Section Completeness: Does the text contain all core sections typical of an academic paper (e.g., Introduction, Method, Results, Discussion/Conclusion)? Are those sections present in content, even if not explicitly labeled?

2. Logical Flow: Does the text progress logically from problem statement to methods, results, and conclusion? Are transitions clear and coherent?

3. Argument Strength: Are claims supported by clear reasoning, evidence, or citations?

Examples:

Text:
We introduce a neural model for syntactic parsing. The introduction explains the motivation, followed by a detailed method, quantitative evaluation, and a discussion of limitations. The paper ends with a clear conclusion.
{ "section_completeness": 9.5, "logical_flow": 9.5, "argument_strength": 9 }

Text:
This work presents a new machine learning model. It includes a method and result section, but lacks an introduction or conclusion. The arguments are somewhat justified, but many claims are stated without empirical support.
{ "section_completeness": 6, "logical_flow": 6.5, "argument_strength": 5 }

Text:
We kind of experimented with a model to check if it might work. It maybe improves performance? We don't really have clear results or comparisons, but it seems promising.
{ "section_completeness": 3, "logical_flow": 2, "argument_strength": 1.5 }

Return a JSON object with scores (0-10) for each category, where 10 is best. Do not include explanations.

Format:
{ "section_completeness": X, "logical_flow": Y, "argument_strength": Z }

Now evaluate the following text:

Text:
"#;

/// Each score is on a 0 to 10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureScores {
    pub section_completeness: f64,
    pub logical_flow: f64,
    pub argument_strength: f64,
}

pub(crate) fn prompt(text: &str) -> String {
    format!("{PROMPT}{text}\n")
}

pub(crate) fn parse(reply: &str) -> Result<StructureScores, ScoringError> {
    parse_reply("structure check", reply)
}

/// Ask `chat` to rate section completeness, logical flow and argument strength.
pub async fn structure_check(
    chat: &dyn ChatCompletion,
    text: &str,
) -> Result<StructureScores, ScoringError> {
    let reply = chat.complete(&prompt(text), MAX_TOKENS).await?;
    parse(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedChat;

    #[test]
    fn parses_all_three_fields() {
        let scores = parse(
            r#"{ "section_completeness": 6, "logical_flow": 6.5, "argument_strength": 5 }"#,
        )
        .unwrap();
        assert_eq!(
            scores,
            StructureScores {
                section_completeness: 6.0,
                logical_flow: 6.5,
                argument_strength: 5.0,
            }
        );
    }

    #[test]
    fn partial_reply_is_an_error() {
        assert!(matches!(
            parse(r#"{ "section_completeness": 6, "logical_flow": 6.5 }"#),
            Err(ScoringError::MalformedReply { .. })
        ));
    }

    #[test]
    fn fenced_reply_is_not_accepted() {
        let reply = "```json\n{ \"section_completeness\": 1, \"logical_flow\": 1, \"argument_strength\": 1 }\n```";
        assert!(parse(reply).is_err());
    }

    #[tokio::test]
    async fn uses_larger_token_budget() {
        let chat = CannedChat::new(
            r#"{"section_completeness": 9.5, "logical_flow": 9, "argument_strength": 8}"#,
        );
        let scores = structure_check(&chat, "Full paper text.").await.unwrap();
        assert_eq!(scores.logical_flow, 9.0);

        let calls = chat.calls.lock().unwrap();
        assert_eq!(calls[0].1, 100);
        assert!(calls[0].0.contains("Argument Strength"));
        assert!(calls[0].0.ends_with("Full paper text.\n"));
    }
}
