pub mod llm_match;
pub mod programmatic;

use std::collections::BTreeMap;
use std::path::PathBuf;

use ai_client::LlmClient;
use leadgen_common::{csv_out, CampaignConfig, EnrichedProfile, QualityTier, VettingResult};

/// Vetting Engine (spec §4.7): per-profile programmatic consistency check
/// plus a structured LLM content-match call, combined into a composite
/// score and quality tier. Every input profile yields exactly one
/// [`VettingResult`] — never null; failures are error-populated results.
pub struct VettingEngine<'a> {
    pub llm: &'a (dyn LlmClient + Send + Sync),
}

impl<'a> VettingEngine<'a> {
    pub fn new(llm: &'a (dyn LlmClient + Send + Sync)) -> Self {
        Self { llm }
    }

    pub async fn run(
        &self,
        profiles: Vec<EnrichedProfile>,
        config: &CampaignConfig,
        data_dir: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<(Vec<VettingResult>, PathBuf)> {
        let results =
            futures::future::join_all(profiles.iter().map(|p| self.vet_one(p, config, now))).await;

        let path = csv_out::write_vetting_csv(data_dir, &config.campaign_id, now, &results)?;
        Ok((results, path))
    }

    async fn vet_one(
        &self,
        profile: &EnrichedProfile,
        config: &CampaignConfig,
        now: chrono::DateTime<chrono::Utc>,
    ) -> VettingResult {
        let consistency = programmatic::check_consistency(profile, now);
        let llm_result = llm_match::run_llm_match(self.llm, profile, config).await;

        let programmatic_contribution = if consistency.passed { 1.0 } else { 0.3 };
        let llm_contribution = llm_result.score.map(|s| s as f64 / 100.0).unwrap_or(0.0);
        let composite = ((0.4 * programmatic_contribution + 0.6 * llm_contribution) * 100.0)
            .round()
            .clamp(0.0, 100.0) as i64;

        let tier = if llm_result.score.is_none() {
            QualityTier::Unvetted
        } else if composite >= 85 {
            QualityTier::A
        } else if composite >= 70 {
            QualityTier::B
        } else if composite >= 50 {
            QualityTier::C
        } else {
            QualityTier::D
        };

        let mut metric_scores = BTreeMap::new();
        metric_scores.insert("recency_score".to_string(), consistency.recency_score);
        metric_scores.insert("frequency_score".to_string(), consistency.frequency_score);

        let final_explanation = match &llm_result.explanation {
            Some(explanation) => format!("{} {}", consistency.reason, explanation),
            None => format!(
                "{} LLM match unavailable; tier marked Unvetted.",
                consistency.reason
            ),
        };

        VettingResult {
            podcast_id: profile.unified_profile_id.clone(),
            programmatic_consistency_passed: consistency.passed,
            programmatic_consistency_reason: consistency.reason,
            days_since_last_episode: consistency.days_since_last_episode,
            average_frequency_days: consistency.average_frequency_days,
            llm_match_score: llm_result.score,
            llm_match_explanation: llm_result.explanation,
            composite_score: composite,
            quality_tier: tier,
            final_explanation,
            metric_scores,
            error: None,
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
        score: i64,
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
            Ok(Some(json!({"score": self.score, "explanation": "Good fit"})))
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
            ideal_podcast_description: Some("desc".into()),
            guest_bio: Some("bio".into()),
            guest_talking_points: vec![],
        }
    }

    #[tokio::test]
    async fn high_llm_score_and_consistent_profile_yields_tier_a() {
        let llm = StubLlm { score: 100 };
        let engine = VettingEngine::new(&llm);
        let now = chrono::Utc::now();
        let profile = EnrichedProfile {
            latest_episode_date: Some(now - chrono::Duration::days(5)),
            first_episode_date: Some(now - chrono::Duration::days(200)),
            total_episodes: Some(20),
            ..Default::default()
        };
        let result = engine.vet_one(&profile, &config(), now).await;
        assert_eq!(result.composite_score, 100);
        assert!(matches!(result.quality_tier, QualityTier::A));
    }

    #[tokio::test]
    async fn missing_llm_score_forces_unvetted_tier() {
        struct NullLlm;
        #[async_trait]
        impl LlmClient for NullLlm {
            async fn grounded_search(&self, _query: &str) -> Result<GroundedAnswer> {
                unimplemented!()
            }
            async fn extract_json(
                &self,
                _s: &str,
                _u: &str,
                _schema: Value,
            ) -> Result<Option<Value>> {
                Ok(None)
            }
        }
        let llm = NullLlm;
        let engine = VettingEngine::new(&llm);
        let now = chrono::Utc::now();
        let profile = EnrichedProfile {
            latest_episode_date: Some(now - chrono::Duration::days(5)),
            first_episode_date: Some(now - chrono::Duration::days(200)),
            total_episodes: Some(20),
            ..Default::default()
        };
        let result = engine.vet_one(&profile, &config(), now).await;
        assert!(matches!(result.quality_tier, QualityTier::Unvetted));
    }
}
