use std::path::PathBuf;
use std::time::Instant;

use ai_client::LlmClient;
use apify_client::ApifyClient;
use chrono::Utc;
use leadgen_common::{
    CampaignConfig, Config, EnrichedProfile, ExecutionStatus, MetricsEvent, MetricsSink,
    SearchType, UnifiedLead, VettingResult,
};
use podcast_catalog::{ListenNotesClient, PodscanClient, RssParser};

use crate::enrichment::EnrichmentOrchestrator;
use crate::search::SearchEngine;
use crate::vetting::VettingEngine;

/// Final result of a campaign run (spec §4.8): the terminal status plus
/// whatever each stage produced before the run ended or failed.
pub struct PipelineOutcome {
    pub execution_status: ExecutionStatus,
    pub leads: Vec<UnifiedLead>,
    pub leads_csv_path: Option<PathBuf>,
    pub profiles: Vec<EnrichedProfile>,
    pub enriched_csv_path: Option<PathBuf>,
    pub vetting_results: Vec<VettingResult>,
    pub vetting_csv_path: Option<PathBuf>,
}

/// Sequences Search → Enrichment → Vetting (spec §4.8). After Search: ends
/// immediately if the stage failed or produced zero leads. After
/// Enrichment: always proceeds to Vetting (an empty profile list
/// short-circuits Vetting to an immediate empty-result end). After Vetting:
/// ends.
pub struct PipelineDriver<'a> {
    pub config: &'a Config,
    pub llm: &'a (dyn LlmClient + Send + Sync),
    pub apify: &'a ApifyClient,
    pub metrics: &'a (dyn MetricsSink),
}

impl<'a> PipelineDriver<'a> {
    pub async fn run(&self, campaign: &CampaignConfig) -> PipelineOutcome {
        if let Err(reason) = campaign.validate() {
            tracing::warn!(reason = %reason, "campaign config failed validation");
            return PipelineOutcome {
                execution_status: ExecutionStatus::SearchFailed("config".to_string()),
                leads: vec![],
                leads_csv_path: None,
                profiles: vec![],
                enriched_csv_path: None,
                vetting_results: vec![],
                vetting_csv_path: None,
            };
        }

        let listennotes = ListenNotesClient::new(self.config.listennotes_api_key.clone());
        let podscan = PodscanClient::new(self.config.podscan_api_key.clone());
        let search_engine = SearchEngine::new(listennotes, podscan);

        let search_started = Instant::now();
        let raw_leads = match campaign.search_type {
            SearchType::Topic => {
                let audience = campaign.target_audience.clone().unwrap_or_default();
                let keywords = crate::keywords::generate_keywords(
                    self.llm,
                    &audience,
                    &campaign.key_messages,
                    campaign.num_keywords,
                )
                .await;
                if keywords.is_empty() {
                    self.emit_stage_event("search", campaign, search_started, &[]);
                    return PipelineOutcome {
                        execution_status: ExecutionStatus::SearchCompleteNoKeywords,
                        leads: vec![],
                        leads_csv_path: None,
                        profiles: vec![],
                        enriched_csv_path: None,
                        vetting_results: vec![],
                        vetting_csv_path: None,
                    };
                }
                search_engine
                    .topic_search(&keywords, campaign.max_results_per_keyword)
                    .await
            }
            SearchType::Related => {
                let seed = campaign.seed_feed_url.clone().unwrap_or_default();
                search_engine
                    .related_search(&seed, campaign.max_depth, campaign.max_total_results)
                    .await
            }
        };

        let now = Utc::now();
        let (leads, leads_csv_path) = match search_engine
            .finish(raw_leads, campaign, &self.config.data_dir, now)
            .await
        {
            Ok((leads, path)) => (leads, path),
            Err(err) => {
                tracing::error!(error = %err, "search stage failed to write artifact");
                return PipelineOutcome {
                    execution_status: ExecutionStatus::SearchFailed("artifact_write".to_string()),
                    leads: vec![],
                    leads_csv_path: None,
                    profiles: vec![],
                    enriched_csv_path: None,
                    vetting_results: vec![],
                    vetting_csv_path: None,
                };
            }
        };

        self.emit_stage_event("search", campaign, search_started, &[("lead_count", leads.len().to_string())]);

        if leads.is_empty() {
            return PipelineOutcome {
                execution_status: ExecutionStatus::SearchCompleteNoResults,
                leads,
                leads_csv_path: Some(leads_csv_path),
                profiles: vec![],
                enriched_csv_path: None,
                vetting_results: vec![],
                vetting_csv_path: None,
            };
        }

        let rss_parser = if self.config.rss_enrichment_enabled {
            Some(RssParser::new())
        } else {
            None
        };
        let orchestrator = EnrichmentOrchestrator::new(self.llm, self.apify, rss_parser.as_ref());

        let enrichment_started = Instant::now();
        let now = Utc::now();
        let (profiles, enriched_csv_path) = match orchestrator
            .run(leads.clone(), &self.config.data_dir, &campaign.campaign_id, now)
            .await
        {
            Ok((profiles, path)) => (profiles, path),
            Err(err) => {
                tracing::error!(error = %err, "enrichment stage failed to write artifact");
                return PipelineOutcome {
                    execution_status: ExecutionStatus::Error("enrichment_artifact_write".to_string()),
                    leads,
                    leads_csv_path: Some(leads_csv_path),
                    profiles: vec![],
                    enriched_csv_path: None,
                    vetting_results: vec![],
                    vetting_csv_path: None,
                };
            }
        };
        self.emit_stage_event(
            "enrichment",
            campaign,
            enrichment_started,
            &[("profile_count", profiles.len().to_string())],
        );

        let vetting_engine = VettingEngine::new(self.llm);
        let vetting_started = Instant::now();
        let now = Utc::now();
        let (vetting_results, vetting_csv_path) = match vetting_engine
            .run(profiles.clone(), campaign, &self.config.data_dir, now)
            .await
        {
            Ok((results, path)) => (results, path),
            Err(err) => {
                tracing::error!(error = %err, "vetting stage failed to write artifact");
                return PipelineOutcome {
                    execution_status: ExecutionStatus::VettingFailed("artifact_write".to_string()),
                    leads,
                    leads_csv_path: Some(leads_csv_path),
                    profiles,
                    enriched_csv_path: Some(enriched_csv_path),
                    vetting_results: vec![],
                    vetting_csv_path: None,
                };
            }
        };
        self.emit_stage_event(
            "vetting",
            campaign,
            vetting_started,
            &[("result_count", vetting_results.len().to_string())],
        );

        PipelineOutcome {
            execution_status: ExecutionStatus::VettingComplete,
            leads,
            leads_csv_path: Some(leads_csv_path),
            profiles,
            enriched_csv_path: Some(enriched_csv_path),
            vetting_results,
            vetting_csv_path: Some(vetting_csv_path),
        }
    }

    fn emit_stage_event(
        &self,
        stage: &str,
        campaign: &CampaignConfig,
        started: Instant,
        metadata: &[(&str, String)],
    ) {
        let mut event = MetricsEvent::new(format!("{stage}.complete"), stage, campaign.campaign_id.clone())
            .with_duration_ms(started.elapsed().as_millis() as u64);
        for (key, value) in metadata {
            event = event.with_metadata(*key, value.clone());
        }
        self.metrics.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::GroundedAnswer;
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    struct NullLlm;

    #[async_trait]
    impl LlmClient for NullLlm {
        async fn grounded_search(&self, _query: &str) -> AnyResult<GroundedAnswer> {
            Ok(GroundedAnswer::default())
        }
        async fn extract_json(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _schema: Value,
        ) -> AnyResult<Option<Value>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingMetricsSink {
        events: Mutex<Vec<MetricsEvent>>,
    }

    impl MetricsSink for RecordingMetricsSink {
        fn record(&self, event: MetricsEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn test_config() -> Config {
        Config {
            listennotes_api_key: "key".into(),
            podscan_api_key: "key".into(),
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            llm_model: "gpt-4o-mini".into(),
            apify_api_key: "key".into(),
            data_dir: std::env::temp_dir().to_string_lossy().to_string(),
            rss_enrichment_enabled: false,
        }
    }

    #[tokio::test]
    async fn invalid_campaign_config_fails_immediately_with_no_stage_events() {
        let config = test_config();
        let llm = NullLlm;
        let apify = ApifyClient::new("token".to_string());
        let metrics = RecordingMetricsSink::default();
        let driver = PipelineDriver {
            config: &config,
            llm: &llm,
            apify: &apify,
            metrics: &metrics,
        };

        let campaign = CampaignConfig {
            campaign_id: "c1".into(),
            search_type: SearchType::Topic,
            target_audience: None,
            key_messages: vec![],
            num_keywords: 10,
            max_results_per_keyword: 50,
            seed_feed_url: None,
            max_depth: 2,
            max_total_results: 50,
            ideal_podcast_description: None,
            guest_bio: None,
            guest_talking_points: vec![],
        };

        let outcome = driver.run(&campaign).await;
        assert_eq!(
            outcome.execution_status,
            ExecutionStatus::SearchFailed("config".to_string())
        );
        assert!(outcome.leads.is_empty());
        assert!(metrics.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn topic_search_with_no_generated_keywords_ends_after_search() {
        let config = test_config();
        let llm = NullLlm;
        let apify = ApifyClient::new("token".to_string());
        let metrics = RecordingMetricsSink::default();
        let driver = PipelineDriver {
            config: &config,
            llm: &llm,
            apify: &apify,
            metrics: &metrics,
        };

        let campaign = CampaignConfig {
            campaign_id: "c1".into(),
            search_type: SearchType::Topic,
            target_audience: Some("indie hackers".into()),
            key_messages: vec![],
            num_keywords: 10,
            max_results_per_keyword: 50,
            seed_feed_url: None,
            max_depth: 2,
            max_total_results: 50,
            ideal_podcast_description: None,
            guest_bio: None,
            guest_talking_points: vec![],
        };

        let outcome = driver.run(&campaign).await;
        assert_eq!(outcome.execution_status, ExecutionStatus::SearchCompleteNoKeywords);
        assert!(outcome.profiles.is_empty());
        assert!(outcome.vetting_results.is_empty());
    }
}

