use std::time::Duration;

use ai_client::LlmClient;
use leadgen_common::UnifiedLead;

use super::hints::{EnrichmentHints, DISCOVERY_TARGETS};
use super::url_post::{post_process_url, HandlePlatform};

/// Delay between grounded-search probes within a single lead's discovery
/// routine (spec §5).
const PROBE_DELAY: Duration = Duration::from_millis(200);

/// Phase 1 (spec §4.6): per-lead discovery producing normalized
/// [`EnrichmentHints`]. Fields the base lead already carries are passed
/// through without a search; everything else is probed with a targeted
/// grounded-search query, the accumulated context is fed to the structured
/// extractor, and the extractor's output is post-processed into
/// well-formed URLs (or null).
pub async fn discover(
    llm: &(dyn LlmClient + Send + Sync),
    lead: &UnifiedLead,
) -> EnrichmentHints {
    let title = lead.title.clone().unwrap_or_else(|| lead.api_id.clone());
    let mut context = String::new();
    let mut first_probe = true;

    for target in DISCOVERY_TARGETS {
        if already_satisfied(lead, target.field) {
            continue;
        }

        if !first_probe {
            tokio::time::sleep(PROBE_DELAY).await;
        }
        first_probe = false;

        let query = target.query_template.replace("{title}", &title);
        match llm.grounded_search(&query).await {
            Ok(answer) => {
                let text = answer.best_text();
                if !text.trim().is_empty() {
                    context.push_str(&format!("## {}\n{}\n\n", target.field, text));
                }
            }
            Err(err) => {
                tracing::warn!(field = target.field, error = %err, "discovery probe failed");
            }
        }
    }

    if context.trim().is_empty() {
        return EnrichmentHints::default();
    }

    let system_prompt = "Extract podcast and host social media URLs and host names from the \
        provided research notes. Emit null for any field not clearly supported by the notes — \
        never guess or fabricate a URL.";
    let user_prompt = format!("Podcast: {title}\n\nResearch notes:\n{context}");

    let extracted = ai_client::extract::<EnrichmentHints>(llm, system_prompt, &user_prompt)
        .await
        .unwrap_or(None)
        .unwrap_or_default();

    post_process(extracted)
}

fn already_satisfied(lead: &UnifiedLead, field: &str) -> bool {
    match field {
        "podcast_twitter_url" => lead.twitter_url.is_some(),
        "podcast_linkedin_url" => lead.linkedin_url.is_some(),
        "podcast_instagram_url" => lead.instagram_url.is_some(),
        "podcast_facebook_url" => lead.facebook_url.is_some(),
        "podcast_youtube_url" => lead.youtube_url.is_some(),
        "podcast_tiktok_url" => lead.tiktok_url.is_some(),
        _ => false,
    }
}

fn post_process(hints: EnrichmentHints) -> EnrichmentHints {
    EnrichmentHints {
        host_names: hints
            .host_names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
        podcast_twitter_url: post_process_url(
            hints.podcast_twitter_url.as_deref(),
            HandlePlatform::Twitter,
        ),
        podcast_linkedin_url: post_process_url(
            hints.podcast_linkedin_url.as_deref(),
            HandlePlatform::Other,
        ),
        podcast_instagram_url: post_process_url(
            hints.podcast_instagram_url.as_deref(),
            HandlePlatform::Other,
        ),
        podcast_facebook_url: post_process_url(
            hints.podcast_facebook_url.as_deref(),
            HandlePlatform::Other,
        ),
        podcast_youtube_url: post_process_url(
            hints.podcast_youtube_url.as_deref(),
            HandlePlatform::Other,
        ),
        podcast_tiktok_url: post_process_url(
            hints.podcast_tiktok_url.as_deref(),
            HandlePlatform::TikTok,
        ),
        host_twitter_url: post_process_url(
            hints.host_twitter_url.as_deref(),
            HandlePlatform::Twitter,
        ),
        host_linkedin_url: post_process_url(
            hints.host_linkedin_url.as_deref(),
            HandlePlatform::Other,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::GroundedAnswer;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn grounded_search(&self, _query: &str) -> Result<GroundedAnswer> {
            Ok(GroundedAnswer {
                answer: Some("Found on twitter.com/someshow".to_string()),
                snippets: vec![],
            })
        }

        async fn extract_json(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _schema: Value,
        ) -> Result<Option<Value>> {
            Ok(Some(json!({
                "host_names": ["Jane Host"],
                "podcast_twitter_url": "@someshow",
                "podcast_linkedin_url": null,
                "podcast_instagram_url": "unknown",
                "podcast_facebook_url": null,
                "podcast_youtube_url": null,
                "podcast_tiktok_url": null,
                "host_twitter_url": null,
                "host_linkedin_url": null,
            })))
        }
    }

    #[tokio::test]
    async fn skips_probes_for_fields_already_on_lead() {
        let lead = UnifiedLead {
            twitter_url: Some("https://twitter.com/already".into()),
            title: Some("Show".into()),
            ..Default::default()
        };
        assert!(already_satisfied(&lead, "podcast_twitter_url"));
        let hints = discover(&StubLlm, &lead).await;
        assert_eq!(
            hints.podcast_twitter_url.as_deref(),
            Some("https://twitter.com/someshow")
        );
    }

    #[tokio::test]
    async fn post_processes_handle_and_sentinel_strings() {
        let lead = UnifiedLead {
            title: Some("Show".into()),
            ..Default::default()
        };
        let hints = discover(&StubLlm, &lead).await;
        assert_eq!(
            hints.podcast_twitter_url.as_deref(),
            Some("https://twitter.com/someshow")
        );
        assert_eq!(hints.podcast_instagram_url, None);
        assert_eq!(hints.host_names, vec!["Jane Host".to_string()]);
    }
}
