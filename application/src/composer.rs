use domain::models::Passage;
use infrastructure::providers::CompletionProvider;
use shared::types::Result;
use std::sync::Arc;

/// Builds the grounded prompt and invokes the language model.
///
/// The context block preserves the retriever's ranked order verbatim;
/// passages are never reordered or deduplicated here, since prompt
/// position can matter to the model.
pub struct AnswerComposer {
    provider: Arc<dyn CompletionProvider>,
    temperature: f32,
}

impl AnswerComposer {
    pub fn new(provider: Arc<dyn CompletionProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    pub fn build_prompt(question: &str, context: &[Passage]) -> String {
        let context_block = context
            .iter()
            .map(|passage| passage.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "You are a financial analyst assistant analyzing company annual reports. \
Your task is to answer questions based ONLY on the provided context from the annual report.\n\
\n\
CRITICAL RULES:\n\
1. Use ONLY the exact numbers and figures found in the context\n\
2. NEVER make up, estimate, or calculate numbers that aren't explicitly stated\n\
3. If a specific figure is not in the context, clearly state \"This information is not available in the provided context\"\n\
4. When citing numbers, quote them exactly as they appear in the source\n\
5. Preserve units (millions, billions, percentages, etc.) exactly as stated\n\
6. If asked about trends or comparisons, only use data explicitly present in the context\n\
\n\
Context from annual report:\n\
{context_block}\n\
\n\
Question: {question}\n\
\n\
Detailed Answer (with exact figures from the context):"
        )
    }

    /// Compose and run the prompt. Zero retrieved passages still invoke
    /// the model with an empty context block; the rules above make it
    /// state unavailability rather than invent an answer.
    pub async fn answer(&self, question: &str, context: &[Passage]) -> Result<String> {
        let prompt = Self::build_prompt(question, context);
        let raw = self.provider.complete(&prompt, self.temperature).await?;
        Ok(raw.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str) -> Passage {
        Passage {
            text: text.to_string(),
            page: 1,
            source_id: "report".to_string(),
        }
    }

    #[test]
    fn context_keeps_ranked_order() {
        let prompt = AnswerComposer::build_prompt(
            "What was revenue?",
            &[passage("ranked-first"), passage("ranked-second")],
        );
        let a = prompt.find("ranked-first").unwrap();
        let b = prompt.find("ranked-second").unwrap();
        assert!(a < b);
    }

    #[test]
    fn duplicates_survive_into_the_prompt() {
        let prompt =
            AnswerComposer::build_prompt("q", &[passage("repeated"), passage("repeated")]);
        assert_eq!(prompt.matches("repeated").count(), 2);
    }

    #[test]
    fn empty_context_still_builds_a_prompt() {
        let prompt = AnswerComposer::build_prompt("What was net income?", &[]);
        assert!(prompt.contains("Question: What was net income?"));
        assert!(prompt.contains("Context from annual report:\n\n"));
    }
}
