use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which catalog API produced a record. Exactly one per [`UnifiedLead`];
/// a merged dedup record carries the priority provider's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceApi {
    Listennotes,
    Podscan,
}

impl SourceApi {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceApi::Listennotes => "listennotes",
            SourceApi::Podscan => "podscan",
        }
    }
}

impl std::fmt::Display for SourceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `CampaignConfig::search_type` discriminant (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Topic,
    Related,
}

/// Pipeline input (spec §3, §6). One per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub campaign_id: String,
    pub search_type: SearchType,

    // --- topic mode ---
    pub target_audience: Option<String>,
    pub key_messages: Vec<String>,
    pub num_keywords: u32,
    pub max_results_per_keyword: u32,

    // --- related mode ---
    pub seed_feed_url: Option<String>,
    pub max_depth: u32,
    pub max_total_results: u32,

    // --- vetting (required if vetting runs) ---
    pub ideal_podcast_description: Option<String>,
    pub guest_bio: Option<String>,
    pub guest_talking_points: Vec<String>,
}

impl CampaignConfig {
    pub const DEFAULT_NUM_KEYWORDS: u32 = 10;
    pub const DEFAULT_MAX_RESULTS_PER_KEYWORD: u32 = 50;
    pub const DEFAULT_MAX_DEPTH: u32 = 2;
    pub const DEFAULT_MAX_TOTAL_RESULTS: u32 = 50;

    /// Sanitize a campaign_id to `[A-Za-z0-9_-]`, replacing anything else
    /// with `_` (spec §6). Used to build on-disk artifact paths.
    pub fn sanitized_id(&self) -> String {
        sanitize_campaign_id(&self.campaign_id)
    }

    /// Validate the config shape the driver relies on before running a
    /// stage. Returns a human-readable reason on failure (spec §7,
    /// "configuration" errors fail the run immediately).
    pub fn validate(&self) -> Result<(), String> {
        match self.search_type {
            SearchType::Topic => {
                if self
                    .target_audience
                    .as_ref()
                    .is_none_or(|s| s.trim().is_empty())
                {
                    return Err("topic search requires target_audience".to_string());
                }
                if !(1..=30).contains(&self.num_keywords) {
                    return Err("num_keywords must be between 1 and 30".to_string());
                }
                if !(1..=200).contains(&self.max_results_per_keyword) {
                    return Err("max_results_per_keyword must be between 1 and 200".to_string());
                }
            }
            SearchType::Related => {
                if self
                    .seed_feed_url
                    .as_ref()
                    .is_none_or(|s| s.trim().is_empty())
                {
                    return Err("related search requires seed_feed_url".to_string());
                }
                if !(1..=3).contains(&self.max_depth) {
                    return Err("max_depth must be between 1 and 3".to_string());
                }
                if !(1..=200).contains(&self.max_total_results) {
                    return Err("max_total_results must be between 1 and 200".to_string());
                }
            }
        }
        Ok(())
    }
}

pub fn sanitize_campaign_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// One row per candidate podcast — the contract between Search and
/// Enrichment (spec §3). All fields nullable except `source_api`.
/// `feed_url` is the deduplication key when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifiedLead {
    // --- identity ---
    pub source_api: Option<SourceApi>,
    pub api_id: String,
    pub feed_url: Option<String>,
    pub itunes_id: Option<i64>,
    pub spotify_id: Option<String>,
    pub website: Option<String>,

    // --- display ---
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub language: Option<String>,

    // --- episode stats ---
    pub total_episodes: Option<i64>,
    pub latest_pub_date_ms: Option<i64>,
    pub earliest_pub_date_ms: Option<i64>,
    pub update_frequency_hours: Option<f64>,

    // --- reach ---
    pub listen_score: Option<i64>,
    pub listen_score_global_rank: Option<String>,
    pub audience_size: Option<i64>,
    pub itunes_rating_average: Option<f64>,
    pub itunes_rating_count: Option<i64>,
    pub spotify_rating_average: Option<f64>,
    pub spotify_rating_count: Option<i64>,

    // --- social URLs ---
    pub twitter_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub youtube_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub other_social_url: Option<String>,

    // --- contact ---
    pub email: Option<String>,
}

impl UnifiedLead {
    /// Best available identifier for a cross-provider lookup: iTunes ID
    /// preferred, feed URL fallback (spec §4.5).
    pub fn best_lookup_key(&self) -> Option<LookupKey<'_>> {
        if let Some(id) = self.itunes_id {
            Some(LookupKey::ItunesId(id))
        } else {
            self.feed_url.as_deref().map(LookupKey::FeedUrl)
        }
    }
}

pub enum LookupKey<'a> {
    ItunesId(i64),
    FeedUrl(&'a str),
}

/// Per-platform reach counters discovered during Enrichment Phase 2/3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReachStats {
    pub twitter_followers: Option<i64>,
    pub twitter_following: Option<i64>,
    pub is_twitter_verified: Option<bool>,
    pub linkedin_connections: Option<i64>,
    pub linkedin_followers: Option<i64>,
    pub instagram_followers: Option<i64>,
    pub tiktok_followers: Option<i64>,
}

/// One row per candidate podcast — the contract between Enrichment and
/// Vetting (spec §3). Superset of [`UnifiedLead`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichedProfile {
    pub unified_profile_id: String,
    pub source_api: Option<SourceApi>,
    pub api_id: String,

    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    pub language: Option<String>,

    pub feed_url: Option<String>,
    pub itunes_id: Option<i64>,
    pub spotify_id: Option<String>,

    pub total_episodes: Option<i64>,
    pub first_episode_date: Option<DateTime<Utc>>,
    pub latest_episode_date: Option<DateTime<Utc>>,
    pub publishing_frequency_days: Option<f64>,

    pub host_names: Vec<String>,

    pub rss_owner_name: Option<String>,
    pub rss_owner_email: Option<String>,
    pub rss_explicit: Option<bool>,
    pub rss_categories: Vec<String>,

    pub primary_email: Option<String>,

    pub podcast_twitter_url: Option<String>,
    pub podcast_linkedin_url: Option<String>,
    pub podcast_instagram_url: Option<String>,
    pub podcast_facebook_url: Option<String>,
    pub podcast_youtube_url: Option<String>,
    pub podcast_tiktok_url: Option<String>,
    pub podcast_other_social_url: Option<String>,
    pub host_twitter_url: Option<String>,
    pub host_linkedin_url: Option<String>,

    pub listen_score: Option<i64>,
    pub listen_score_global_rank: Option<String>,
    pub audience_size: Option<i64>,
    pub itunes_rating_average: Option<f64>,
    pub itunes_rating_count: Option<i64>,
    pub spotify_rating_average: Option<f64>,
    pub spotify_rating_count: Option<i64>,

    #[serde(flatten)]
    pub reach: ReachStats,

    pub data_sources: Vec<String>,
    pub last_enriched_at: DateTime<Utc>,
}

/// Ordinal quality bucket assigned by the Vetting engine (spec §3, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityTier {
    A,
    B,
    C,
    D,
    #[serde(rename = "Unvetted")]
    Unvetted,
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::A => write!(f, "A"),
            QualityTier::B => write!(f, "B"),
            QualityTier::C => write!(f, "C"),
            QualityTier::D => write!(f, "D"),
            QualityTier::Unvetted => write!(f, "Unvetted"),
        }
    }
}

/// One row per vetted profile (spec §3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettingResult {
    pub podcast_id: String,
    pub programmatic_consistency_passed: bool,
    pub programmatic_consistency_reason: String,
    pub days_since_last_episode: Option<i64>,
    pub average_frequency_days: Option<f64>,
    pub llm_match_score: Option<i64>,
    pub llm_match_explanation: Option<String>,
    pub composite_score: i64,
    pub quality_tier: QualityTier,
    pub final_explanation: String,
    pub metric_scores: std::collections::BTreeMap<String, f64>,
    pub error: Option<String>,
}

/// Closed set of terminal/intermediate statuses the driver assigns to a
/// run (spec §7). Serializes to the snake_case strings spec.md names
/// (e.g. `search_failed_config`, `enrichment_complete_with_errors`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    SearchComplete,
    SearchCompleteNoResults,
    SearchCompleteNoKeywords,
    SearchFailed(String),
    EnrichmentComplete,
    EnrichmentCompleteWithErrors,
    VettingComplete,
    VettingFailed(String),
    Error(String),
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::SearchComplete => write!(f, "search_complete"),
            ExecutionStatus::SearchCompleteNoResults => write!(f, "search_complete_no_results"),
            ExecutionStatus::SearchCompleteNoKeywords => write!(f, "search_complete_no_keywords"),
            ExecutionStatus::SearchFailed(reason) => write!(f, "search_failed_{reason}"),
            ExecutionStatus::EnrichmentComplete => write!(f, "enrichment_complete"),
            ExecutionStatus::EnrichmentCompleteWithErrors => {
                write!(f, "enrichment_complete_with_errors")
            }
            ExecutionStatus::VettingComplete => write!(f, "vetting_complete"),
            ExecutionStatus::VettingFailed(reason) => write!(f, "vetting_failed_{reason}"),
            ExecutionStatus::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_campaign_id_replaces_unsafe_chars() {
        assert_eq!(sanitize_campaign_id("c1"), "c1");
        assert_eq!(sanitize_campaign_id("c 1/../etc"), "c_1___etc");
    }

    #[test]
    fn topic_config_requires_target_audience() {
        let cfg = CampaignConfig {
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
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn best_lookup_key_prefers_itunes_id() {
        let lead = UnifiedLead {
            itunes_id: Some(42),
            feed_url: Some("https://x/rss".into()),
            ..Default::default()
        };
        assert!(matches!(lead.best_lookup_key(), Some(LookupKey::ItunesId(42))));
    }

    #[test]
    fn best_lookup_key_falls_back_to_feed_url() {
        let lead = UnifiedLead {
            itunes_id: None,
            feed_url: Some("https://x/rss".into()),
            ..Default::default()
        };
        assert!(matches!(
            lead.best_lookup_key(),
            Some(LookupKey::FeedUrl(url)) if url == "https://x/rss"
        ));
    }

    #[test]
    fn execution_status_formats_closed_set_strings() {
        assert_eq!(ExecutionStatus::SearchComplete.to_string(), "search_complete");
        assert_eq!(
            ExecutionStatus::SearchFailed("config".into()).to_string(),
            "search_failed_config"
        );
    }
}
