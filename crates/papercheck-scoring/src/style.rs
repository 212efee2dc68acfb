//! Writing-style score (0 to 10) from a chat model.

use serde::Deserialize;

use crate::chat::ChatCompletion;
use crate::{ScoringError, parse_reply};

const MAX_TOKENS: u32 = 20;

const PROMPT: &str = r#"Evaluate the following academic abstract for writing style rigorously, considering:
- Formality and professionalism of tone
- Clarity and conciseness
- Avoidance of excessive hedging or vague language
- Do not consider formulas, equations, tables and figures, concentrate only on plain text

Examples:

Text:
This paper investigates how transformer models can be used in multilingual parsing. We evaluate performance across 25 languages and demonstrate improvements over existing benchmarks.
{ "style_score": 9 }

Text:
We sort of try to show that there may be a correlation between neural activation patterns and general intelligence, but it's hard to be totally sure. This paper presents some observations.
{ "style_score": 4.5 }

Text:
In this work, we describe an approach for classifying temporal expressions using rule-based logic and statistical tagging. Our results indicate reliable improvements on annotated corpora.
{ "style_score": 8 }

Return your score as JSON:
{ "style_score": X }
Do not write nothing except JSON.

Now evaluate the following text:

Text:
"#;

#[derive(Deserialize)]
struct StyleReply {
    style_score: f64,
}

pub(crate) fn prompt(text: &str) -> String {
    format!("{PROMPT}{text}\n")
}

pub(crate) fn parse(reply: &str) -> Result<f64, ScoringError> {
    parse_reply::<StyleReply>("style check", reply).map(|r| r.style_score)
}

/// Ask `chat` to rate the writing style of `text`.
pub async fn style_check(chat: &dyn ChatCompletion, text: &str) -> Result<f64, ScoringError> {
    let reply = chat.complete(&prompt(text), MAX_TOKENS).await?;
    parse(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedChat;

    #[test]
    fn parses_integer_and_fractional_scores() {
        assert_eq!(parse(r#"{ "style_score": 9 }"#).unwrap(), 9.0);
        assert_eq!(parse(r#"{"style_score": 4.5}"#).unwrap(), 4.5);
    }

    #[test]
    fn prose_reply_is_an_error() {
        let err = parse("The style is quite good, maybe 8/10.").unwrap_err();
        match err {
            ScoringError::MalformedReply { service, reply, .. } => {
                assert_eq!(service, "style check");
                assert!(reply.starts_with("The style"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_field_is_an_error() {
        assert!(matches!(
            parse(r#"{"score": 7}"#),
            Err(ScoringError::MalformedReply { .. })
        ));
    }

    #[test]
    fn prompt_ends_with_the_text() {
        let p = prompt("Our method works.");
        assert!(p.contains("{ \"style_score\": X }"));
        assert!(p.ends_with("Text:\nOur method works.\n"));
    }

    #[tokio::test]
    async fn sends_prompt_with_small_token_budget() {
        let chat = CannedChat::new("  {\"style_score\": 7.5}\n");
        let score = style_check(&chat, "We study parsing.").await.unwrap();
        assert_eq!(score, 7.5);

        let calls = chat.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, 20);
        assert!(calls[0].0.ends_with("We study parsing.\n"));
    }
}
