use ai_client::LlmClient;
use leadgen_common::{CampaignConfig, EnrichedProfile};
use schemars::JsonSchema;
use serde::Deserialize;

/// Structured output schema for the LLM content-match call (spec §4.7): a
/// 0-100 integer score and a short explanation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LlmMatchOutput {
    pub score: i64,
    pub explanation: String,
}

/// Result of the LLM match step. Both fields null on any error or
/// malformed response, with a failure note instead.
pub struct LlmMatchResult {
    pub score: Option<i64>,
    pub explanation: Option<String>,
}

pub async fn run_llm_match(
    llm: &(dyn LlmClient + Send + Sync),
    profile: &EnrichedProfile,
    config: &CampaignConfig,
) -> LlmMatchResult {
    let system_prompt = "You are scoring how well a podcast matches an ideal guest profile. \
        Return an integer score from 0 to 100 and a short explanation.";

    let user_prompt = format!(
        "Podcast title: {title}\n\
         Podcast description: {description}\n\
         Ideal podcast description: {ideal}\n\
         Guest bio: {bio}\n\
         Guest talking points: {points}",
        title = profile.title.as_deref().unwrap_or("(unknown)"),
        description = profile.description.as_deref().unwrap_or("(none)"),
        ideal = config.ideal_podcast_description.as_deref().unwrap_or("(none provided)"),
        bio = config.guest_bio.as_deref().unwrap_or("(none provided)"),
        points = config.guest_talking_points.join("; "),
    );

    match ai_client::extract::<LlmMatchOutput>(llm, system_prompt, &user_prompt).await {
        Ok(Some(output)) => LlmMatchResult {
            score: Some(output.score.clamp(0, 100)),
            explanation: Some(output.explanation),
        },
        Ok(None) => LlmMatchResult {
            score: None,
            explanation: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "llm content match failed");
            LlmMatchResult {
                score: None,
                explanation: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::GroundedAnswer;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StubLlm {
        response: Option<Value>,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn grounded_search(&self, _query: &str) -> Result<GroundedAnswer> {
            unimplemented!()
        }

        async fn extract_json(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _schema: Value,
        ) -> Result<Option<Value>> {
            Ok(self.response.clone())
        }
    }

    fn config() -> CampaignConfig {
        CampaignConfig {
            campaign_id: "c1".into(),
            search_type: leadgen_common::SearchType::Topic,
            target_audience: None,
            key_messages: vec![],
            num_keywords: 10,
            max_results_per_keyword: 50,
            seed_feed_url: None,
            max_depth: 2,
            max_total_results: 50,
            ideal_podcast_description: Some("B2B SaaS growth show".into()),
            guest_bio: Some("Growth marketer".into()),
            guest_talking_points: vec!["PLG".into()],
        }
    }

    #[tokio::test]
    async fn parses_valid_score_and_explanation() {
        let llm = StubLlm {
            response: Some(json!({"score": 85, "explanation": "Strong match"})),
        };
        let result = run_llm_match(&llm, &EnrichedProfile::default(), &config()).await;
        assert_eq!(result.score, Some(85));
        assert_eq!(result.explanation.as_deref(), Some("Strong match"));
    }

    #[tokio::test]
    async fn malformed_response_yields_null_fields() {
        let llm = StubLlm { response: None };
        let result = run_llm_match(&llm, &EnrichedProfile::default(), &config()).await;
        assert_eq!(result.score, None);
        assert_eq!(result.explanation, None);
    }
}
