use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{sanitize_campaign_id, EnrichedProfile, SearchType, UnifiedLead, VettingResult};

/// Convert a raw epoch-millisecond timestamp to an ISO-8601 string for CSV
/// output (spec §6). The in-memory record keeps the raw integer; this
/// conversion happens only in the CSV row shadow.
fn ms_to_iso8601(ms: Option<i64>) -> String {
    match ms {
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        None => String::new(),
    }
}

fn join_semicolon(items: &[String]) -> String {
    items.join("; ")
}

fn campaign_dir(data_dir: &str, campaign_id: &str) -> PathBuf {
    Path::new(data_dir).join(sanitize_campaign_id(campaign_id))
}

/// Timestamp component for artifact filenames (spec §6): `YYYYmmdd_HHMMSS`.
fn timestamp_component(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Row shadow matching [`UnifiedLead`]'s field order, with `_ms` fields
/// rewritten to ISO-8601 (spec §6).
#[derive(Serialize)]
struct LeadRow<'a> {
    source_api: String,
    api_id: &'a str,
    feed_url: &'a str,
    itunes_id: String,
    spotify_id: &'a str,
    website: &'a str,
    title: &'a str,
    description: &'a str,
    image_url: &'a str,
    language: &'a str,
    total_episodes: String,
    latest_pub_date: String,
    earliest_pub_date: String,
    update_frequency_hours: String,
    listen_score: String,
    listen_score_global_rank: &'a str,
    audience_size: String,
    itunes_rating_average: String,
    itunes_rating_count: String,
    spotify_rating_average: String,
    spotify_rating_count: String,
    twitter_url: &'a str,
    linkedin_url: &'a str,
    instagram_url: &'a str,
    facebook_url: &'a str,
    youtube_url: &'a str,
    tiktok_url: &'a str,
    other_social_url: &'a str,
    email: &'a str,
}

impl<'a> From<&'a UnifiedLead> for LeadRow<'a> {
    fn from(lead: &'a UnifiedLead) -> Self {
        LeadRow {
            source_api: lead.source_api.map(|s| s.as_str().to_string()).unwrap_or_default(),
            api_id: &lead.api_id,
            feed_url: lead.feed_url.as_deref().unwrap_or_default(),
            itunes_id: lead.itunes_id.map(|v| v.to_string()).unwrap_or_default(),
            spotify_id: lead.spotify_id.as_deref().unwrap_or_default(),
            website: lead.website.as_deref().unwrap_or_default(),
            title: lead.title.as_deref().unwrap_or_default(),
            description: lead.description.as_deref().unwrap_or_default(),
            image_url: lead.image_url.as_deref().unwrap_or_default(),
            language: lead.language.as_deref().unwrap_or_default(),
            total_episodes: lead.total_episodes.map(|v| v.to_string()).unwrap_or_default(),
            latest_pub_date: ms_to_iso8601(lead.latest_pub_date_ms),
            earliest_pub_date: ms_to_iso8601(lead.earliest_pub_date_ms),
            update_frequency_hours: lead
                .update_frequency_hours
                .map(|v| v.to_string())
                .unwrap_or_default(),
            listen_score: lead.listen_score.map(|v| v.to_string()).unwrap_or_default(),
            listen_score_global_rank: lead.listen_score_global_rank.as_deref().unwrap_or_default(),
            audience_size: lead.audience_size.map(|v| v.to_string()).unwrap_or_default(),
            itunes_rating_average: lead
                .itunes_rating_average
                .map(|v| v.to_string())
                .unwrap_or_default(),
            itunes_rating_count: lead
                .itunes_rating_count
                .map(|v| v.to_string())
                .unwrap_or_default(),
            spotify_rating_average: lead
                .spotify_rating_average
                .map(|v| v.to_string())
                .unwrap_or_default(),
            spotify_rating_count: lead
                .spotify_rating_count
                .map(|v| v.to_string())
                .unwrap_or_default(),
            twitter_url: lead.twitter_url.as_deref().unwrap_or_default(),
            linkedin_url: lead.linkedin_url.as_deref().unwrap_or_default(),
            instagram_url: lead.instagram_url.as_deref().unwrap_or_default(),
            facebook_url: lead.facebook_url.as_deref().unwrap_or_default(),
            youtube_url: lead.youtube_url.as_deref().unwrap_or_default(),
            tiktok_url: lead.tiktok_url.as_deref().unwrap_or_default(),
            other_social_url: lead.other_social_url.as_deref().unwrap_or_default(),
            email: lead.email.as_deref().unwrap_or_default(),
        }
    }
}

/// Row shadow matching [`EnrichedProfile`]'s field order.
#[derive(Serialize)]
struct EnrichedRow<'a> {
    unified_profile_id: &'a str,
    source_api: String,
    api_id: &'a str,
    title: &'a str,
    description: &'a str,
    image_url: &'a str,
    website: &'a str,
    language: &'a str,
    feed_url: &'a str,
    itunes_id: String,
    spotify_id: &'a str,
    total_episodes: String,
    first_episode_date: String,
    latest_episode_date: String,
    publishing_frequency_days: String,
    host_names: String,
    rss_owner_name: &'a str,
    rss_owner_email: &'a str,
    rss_explicit: String,
    rss_categories: String,
    primary_email: &'a str,
    podcast_twitter_url: &'a str,
    podcast_linkedin_url: &'a str,
    podcast_instagram_url: &'a str,
    podcast_facebook_url: &'a str,
    podcast_youtube_url: &'a str,
    podcast_tiktok_url: &'a str,
    podcast_other_social_url: &'a str,
    host_twitter_url: &'a str,
    host_linkedin_url: &'a str,
    listen_score: String,
    listen_score_global_rank: &'a str,
    audience_size: String,
    itunes_rating_average: String,
    itunes_rating_count: String,
    spotify_rating_average: String,
    spotify_rating_count: String,
    twitter_followers: String,
    twitter_following: String,
    is_twitter_verified: String,
    linkedin_connections: String,
    linkedin_followers: String,
    instagram_followers: String,
    tiktok_followers: String,
    data_sources: String,
    last_enriched_at: String,
}

impl<'a> From<&'a EnrichedProfile> for EnrichedRow<'a> {
    fn from(p: &'a EnrichedProfile) -> Self {
        EnrichedRow {
            unified_profile_id: &p.unified_profile_id,
            source_api: p.source_api.map(|s| s.as_str().to_string()).unwrap_or_default(),
            api_id: &p.api_id,
            title: p.title.as_deref().unwrap_or_default(),
            description: p.description.as_deref().unwrap_or_default(),
            image_url: p.image_url.as_deref().unwrap_or_default(),
            website: p.website.as_deref().unwrap_or_default(),
            language: p.language.as_deref().unwrap_or_default(),
            feed_url: p.feed_url.as_deref().unwrap_or_default(),
            itunes_id: p.itunes_id.map(|v| v.to_string()).unwrap_or_default(),
            spotify_id: p.spotify_id.as_deref().unwrap_or_default(),
            total_episodes: p.total_episodes.map(|v| v.to_string()).unwrap_or_default(),
            first_episode_date: p
                .first_episode_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            latest_episode_date: p
                .latest_episode_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            publishing_frequency_days: p
                .publishing_frequency_days
                .map(|v| v.to_string())
                .unwrap_or_default(),
            host_names: join_semicolon(&p.host_names),
            rss_owner_name: p.rss_owner_name.as_deref().unwrap_or_default(),
            rss_owner_email: p.rss_owner_email.as_deref().unwrap_or_default(),
            rss_explicit: p.rss_explicit.map(|v| v.to_string()).unwrap_or_default(),
            rss_categories: join_semicolon(&p.rss_categories),
            primary_email: p.primary_email.as_deref().unwrap_or_default(),
            podcast_twitter_url: p.podcast_twitter_url.as_deref().unwrap_or_default(),
            podcast_linkedin_url: p.podcast_linkedin_url.as_deref().unwrap_or_default(),
            podcast_instagram_url: p.podcast_instagram_url.as_deref().unwrap_or_default(),
            podcast_facebook_url: p.podcast_facebook_url.as_deref().unwrap_or_default(),
            podcast_youtube_url: p.podcast_youtube_url.as_deref().unwrap_or_default(),
            podcast_tiktok_url: p.podcast_tiktok_url.as_deref().unwrap_or_default(),
            podcast_other_social_url: p.podcast_other_social_url.as_deref().unwrap_or_default(),
            host_twitter_url: p.host_twitter_url.as_deref().unwrap_or_default(),
            host_linkedin_url: p.host_linkedin_url.as_deref().unwrap_or_default(),
            listen_score: p.listen_score.map(|v| v.to_string()).unwrap_or_default(),
            listen_score_global_rank: p.listen_score_global_rank.as_deref().unwrap_or_default(),
            audience_size: p.audience_size.map(|v| v.to_string()).unwrap_or_default(),
            itunes_rating_average: p
                .itunes_rating_average
                .map(|v| v.to_string())
                .unwrap_or_default(),
            itunes_rating_count: p
                .itunes_rating_count
                .map(|v| v.to_string())
                .unwrap_or_default(),
            spotify_rating_average: p
                .spotify_rating_average
                .map(|v| v.to_string())
                .unwrap_or_default(),
            spotify_rating_count: p
                .spotify_rating_count
                .map(|v| v.to_string())
                .unwrap_or_default(),
            twitter_followers: p
                .reach
                .twitter_followers
                .map(|v| v.to_string())
                .unwrap_or_default(),
            twitter_following: p
                .reach
                .twitter_following
                .map(|v| v.to_string())
                .unwrap_or_default(),
            is_twitter_verified: p
                .reach
                .is_twitter_verified
                .map(|v| v.to_string())
                .unwrap_or_default(),
            linkedin_connections: p
                .reach
                .linkedin_connections
                .map(|v| v.to_string())
                .unwrap_or_default(),
            linkedin_followers: p
                .reach
                .linkedin_followers
                .map(|v| v.to_string())
                .unwrap_or_default(),
            instagram_followers: p
                .reach
                .instagram_followers
                .map(|v| v.to_string())
                .unwrap_or_default(),
            tiktok_followers: p
                .reach
                .tiktok_followers
                .map(|v| v.to_string())
                .unwrap_or_default(),
            data_sources: join_semicolon(&p.data_sources),
            last_enriched_at: p.last_enriched_at.to_rfc3339(),
        }
    }
}

/// Row shadow matching [`VettingResult`]'s field order.
#[derive(Serialize)]
struct VettingRow<'a> {
    podcast_id: &'a str,
    programmatic_consistency_passed: bool,
    programmatic_consistency_reason: &'a str,
    days_since_last_episode: String,
    average_frequency_days: String,
    llm_match_score: String,
    llm_match_explanation: &'a str,
    composite_score: i64,
    quality_tier: String,
    final_explanation: &'a str,
    metric_scores: String,
    error: &'a str,
}

impl<'a> From<&'a VettingResult> for VettingRow<'a> {
    fn from(v: &'a VettingResult) -> Self {
        VettingRow {
            podcast_id: &v.podcast_id,
            programmatic_consistency_passed: v.programmatic_consistency_passed,
            programmatic_consistency_reason: &v.programmatic_consistency_reason,
            days_since_last_episode: v
                .days_since_last_episode
                .map(|d| d.to_string())
                .unwrap_or_default(),
            average_frequency_days: v
                .average_frequency_days
                .map(|d| d.to_string())
                .unwrap_or_default(),
            llm_match_score: v.llm_match_score.map(|s| s.to_string()).unwrap_or_default(),
            llm_match_explanation: v.llm_match_explanation.as_deref().unwrap_or_default(),
            composite_score: v.composite_score,
            quality_tier: v.quality_tier.to_string(),
            final_explanation: &v.final_explanation,
            metric_scores: serde_json::to_string(&v.metric_scores).unwrap_or_default(),
            error: v.error.as_deref().unwrap_or_default(),
        }
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating artifact directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("opening csv writer for {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Write the Search stage's CSV artifact for a campaign (spec §6):
/// `data/campaigns/<campaign_id>/<topic|related>/<prefix>_<campaign_id>_<timestamp>.csv`.
/// Returns the path written.
pub fn write_leads_csv(
    data_dir: &str,
    campaign_id: &str,
    search_type: SearchType,
    now: DateTime<Utc>,
    leads: &[UnifiedLead],
) -> Result<PathBuf> {
    let mode_dir = match search_type {
        SearchType::Topic => "topic",
        SearchType::Related => "related",
    };
    let sanitized = sanitize_campaign_id(campaign_id);
    let filename = format!(
        "leads_{sanitized}_{timestamp}.csv",
        timestamp = timestamp_component(now)
    );
    let path = campaign_dir(data_dir, campaign_id).join(mode_dir).join(filename);
    write_csv(&path, leads.iter().map(LeadRow::from))?;
    Ok(path)
}

/// Write the Enrichment stage's CSV artifact for a campaign (spec §6):
/// `data/campaigns/<campaign_id>/enrichment_results/enriched_profiles_<timestamp>.csv`.
pub fn write_enriched_csv(
    data_dir: &str,
    campaign_id: &str,
    now: DateTime<Utc>,
    profiles: &[EnrichedProfile],
) -> Result<PathBuf> {
    let filename = format!("enriched_profiles_{}.csv", timestamp_component(now));
    let path = campaign_dir(data_dir, campaign_id)
        .join("enrichment_results")
        .join(filename);
    write_csv(&path, profiles.iter().map(EnrichedRow::from))?;
    Ok(path)
}

/// Write the Vetting stage's CSV artifact for a campaign (spec §6):
/// `data/campaigns/<campaign_id>/vetting_results/vetting_output_<campaign_id>_<timestamp>.csv`.
pub fn write_vetting_csv(
    data_dir: &str,
    campaign_id: &str,
    now: DateTime<Utc>,
    results: &[VettingResult],
) -> Result<PathBuf> {
    let sanitized = sanitize_campaign_id(campaign_id);
    let filename = format!(
        "vetting_output_{sanitized}_{timestamp}.csv",
        timestamp = timestamp_component(now)
    );
    let path = campaign_dir(data_dir, campaign_id)
        .join("vetting_results")
        .join(filename);
    write_csv(&path, results.iter().map(VettingRow::from))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_to_iso8601_formats_known_timestamp() {
        // 2024-01-01T00:00:00Z
        let got = ms_to_iso8601(Some(1704067200000));
        assert!(got.starts_with("2024-01-01T00:00:00"));
    }

    #[test]
    fn ms_to_iso8601_empty_on_none() {
        assert_eq!(ms_to_iso8601(None), "");
    }

    #[test]
    fn write_leads_csv_creates_campaign_scoped_file() {
        let tmp = std::env::temp_dir().join(format!(
            "leadgen-common-csv-test-{}",
            std::process::id()
        ));
        let leads = vec![UnifiedLead {
            api_id: "abc123".into(),
            title: Some("Test Show".into()),
            ..Default::default()
        }];
        let now = DateTime::<Utc>::from_timestamp_millis(1704067200000).unwrap();
        let path = write_leads_csv(
            tmp.to_str().unwrap(),
            "Campaign #1",
            SearchType::Topic,
            now,
            &leads,
        )
        .unwrap();
        assert!(path.to_string_lossy().contains("Campaign__1/topic/leads_Campaign__1_"));
        assert!(path.exists());
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn write_vetting_csv_serializes_metric_scores_as_json() {
        let tmp = std::env::temp_dir().join(format!(
            "leadgen-common-vetting-csv-test-{}",
            std::process::id()
        ));
        let mut metric_scores = std::collections::BTreeMap::new();
        metric_scores.insert("recency_score".to_string(), 1.0);
        metric_scores.insert("frequency_score".to_string(), 0.7);
        let results = vec![VettingResult {
            podcast_id: "feed-1".into(),
            programmatic_consistency_passed: true,
            programmatic_consistency_reason: "ok".into(),
            days_since_last_episode: Some(5),
            average_frequency_days: Some(10.0),
            llm_match_score: Some(90),
            llm_match_explanation: Some("great fit".into()),
            composite_score: 94,
            quality_tier: crate::types::QualityTier::A,
            final_explanation: "ok great fit".into(),
            metric_scores,
            error: None,
        }];
        let now = DateTime::<Utc>::from_timestamp_millis(1704067200000).unwrap();
        let path = write_vetting_csv(tmp.to_str().unwrap(), "c1", now, &results).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("metric_scores"));
        assert!(contents.contains("recency_score"));
        assert!(contents.contains("frequency_score"));
        std::fs::remove_dir_all(&tmp).ok();
    }
}
