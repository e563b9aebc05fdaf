use ai_client::LlmClient;

/// Generate up to `num_keywords` search keywords (2-4 words each) for a
/// topic-mode campaign from the target audience and key messages.
/// Grounded on `examples/original_source/src/services/keyword_service.py`:
/// a single free-form LLM prompt, newline-separated output with no
/// numbering, clipped to the requested count. Returns an empty vec on a
/// blocked or empty model response rather than erroring — keyword
/// generation failing is a `search_complete_no_keywords` outcome for the
/// driver, not a stage failure.
pub async fn generate_keywords(
    llm: &(dyn LlmClient + Send + Sync),
    target_audience: &str,
    key_messages: &[String],
    num_keywords: u32,
) -> Vec<String> {
    let messages = if key_messages.is_empty() {
        "(none provided)".to_string()
    } else {
        key_messages.join("; ")
    };

    let prompt = format!(
        "Generate {num_keywords} search keywords for finding podcasts whose \
         audience matches the following target audience. Each keyword must be \
         2 to 4 words long. Return one keyword per line, with no numbering, \
         bullets, or extra commentary.\n\n\
         Target audience: {target_audience}\n\
         Key messages: {messages}"
    );

    let answer = match llm.grounded_search(&prompt).await {
        Ok(answer) => answer,
        Err(err) => {
            tracing::warn!(error = %err, "keyword generation failed");
            return Vec::new();
        }
    };

    let text = answer.best_text();
    if text.trim().is_empty() {
        return Vec::new();
    }

    let keywords: Vec<String> = text
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
        .filter(|line| !line.is_empty())
        .take(num_keywords as usize)
        .collect();

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::GroundedAnswer;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Value;

    struct StubLlm {
        response: String,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn grounded_search(&self, _query: &str) -> Result<GroundedAnswer> {
            Ok(GroundedAnswer {
                answer: Some(self.response.clone()),
                snippets: vec![],
            })
        }

        async fn extract_json(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _schema: Value,
        ) -> Result<Option<Value>> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn clips_to_requested_count_and_strips_bullets() {
        let llm = StubLlm {
            response: "- b2b saas marketing\n* founder growth tips\nproduct led growth\nfourth line"
                .to_string(),
        };
        let keywords = generate_keywords(&llm, "SaaS founders", &[], 3).await;
        assert_eq!(
            keywords,
            vec!["b2b saas marketing", "founder growth tips", "product led growth"]
        );
    }

    #[tokio::test]
    async fn empty_response_returns_empty_vec() {
        let llm = StubLlm {
            response: "   ".to_string(),
        };
        let keywords = generate_keywords(&llm, "SaaS founders", &[], 5).await;
        assert!(keywords.is_empty());
    }
}
