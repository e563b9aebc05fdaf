use chrono::{DateTime, Utc};

use leadgen_common::{canonicalize_twitter_url, canonicalize_url, EnrichedProfile, ReachStats, UnifiedLead};
use podcast_catalog::RssFeedInfo;

use super::hints::EnrichmentHints;
use super::scraping::PlatformStatsMaps;

/// Phase 3 (spec §4.6): given a lead, its Phase 1 hints, the Phase 2 stats
/// maps, and optional RSS data, pick the winning URL per platform and
/// assemble the final [`EnrichedProfile`].
///
/// Winner priority: (1) the URL already on the base lead, (2) the
/// discovery hint — for Twitter the podcast-oriented hint wins over the
/// host-oriented one; for LinkedIn, the podcast hint is tried before the
/// host hint so `host_linkedin_url` still serves as the LinkedIn slot's
/// fallback. Instagram/Facebook/YouTube/TikTok only have a podcast-oriented
/// hint. A winner must still be `http(s)://` to count.
pub fn merge_profile(
    lead: &UnifiedLead,
    hints: &EnrichmentHints,
    stats: &PlatformStatsMaps,
    rss: Option<&RssFeedInfo>,
    now: DateTime<Utc>,
) -> EnrichedProfile {
    let source_tag = lead
        .source_api
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let mut data_sources = vec![format!("search_{source_tag}")];

    let twitter_winner = pick_winner(&[
        lead.twitter_url.as_deref(),
        hints.podcast_twitter_url.as_deref(),
        hints.host_twitter_url.as_deref(),
    ]);
    let linkedin_winner = pick_winner(&[
        lead.linkedin_url.as_deref(),
        hints.podcast_linkedin_url.as_deref(),
        hints.host_linkedin_url.as_deref(),
    ]);
    let instagram_winner = pick_winner(&[lead.instagram_url.as_deref(), hints.podcast_instagram_url.as_deref()]);
    let facebook_winner = pick_winner(&[lead.facebook_url.as_deref(), hints.podcast_facebook_url.as_deref()]);
    let youtube_winner = pick_winner(&[lead.youtube_url.as_deref(), hints.podcast_youtube_url.as_deref()]);
    let tiktok_winner = pick_winner(&[lead.tiktok_url.as_deref(), hints.podcast_tiktok_url.as_deref()]);

    let twitter_stats = twitter_winner
        .as_deref()
        .and_then(canonicalize_twitter_url)
        .and_then(|url| stats.twitter.get(&url).cloned());
    let linkedin_stats = linkedin_winner
        .as_deref()
        .and_then(canonicalize_url)
        .and_then(|url| stats.linkedin.get(&url).cloned());
    let instagram_stats = instagram_winner
        .as_deref()
        .and_then(canonicalize_url)
        .and_then(|url| stats.instagram.get(&url).cloned());
    let tiktok_stats = tiktok_winner
        .as_deref()
        .and_then(canonicalize_url)
        .and_then(|url| stats.tiktok.get(&url).cloned());

    // Tags follow the original's fixed per-platform naming: 'apify_podcast_twitter'
    // for Twitter regardless of which slot supplied the winning URL,
    // 'apify_host_linkedin' for LinkedIn (the scraper is host-profile oriented in
    // practice), and 'apify_podcast_<platform>' for Instagram/TikTok. The tag
    // records that the batch returned *an entry*, not that every counter in it
    // is non-null.
    if twitter_stats.is_some() {
        data_sources.push("apify_podcast_twitter".to_string());
    }
    if linkedin_stats.is_some() {
        data_sources.push("apify_host_linkedin".to_string());
    }
    if instagram_stats.is_some() {
        data_sources.push("apify_podcast_instagram".to_string());
    }
    if tiktok_stats.is_some() {
        data_sources.push("apify_podcast_tiktok".to_string());
    }
    if !hints.host_names.is_empty() {
        data_sources.push("gemini_host".to_string());
    }

    let reach = ReachStats {
        twitter_followers: twitter_stats.as_ref().and_then(|s| s.followers_count),
        twitter_following: twitter_stats.as_ref().and_then(|s| s.following_count),
        is_twitter_verified: twitter_stats.as_ref().and_then(|s| s.is_verified),
        linkedin_connections: linkedin_stats.as_ref().and_then(|s| s.connections_count),
        linkedin_followers: linkedin_stats.as_ref().and_then(|s| s.followers_count),
        instagram_followers: instagram_stats.as_ref().and_then(|s| s.followers_count),
        tiktok_followers: tiktok_stats.as_ref().and_then(|s| s.followers_count),
    };

    let mut profile = EnrichedProfile {
        unified_profile_id: lead
            .feed_url
            .clone()
            .unwrap_or_else(|| lead.api_id.clone()),
        source_api: lead.source_api,
        api_id: lead.api_id.clone(),
        title: lead.title.clone(),
        description: lead.description.clone(),
        image_url: lead.image_url.clone(),
        website: lead.website.clone(),
        language: lead.language.clone(),
        feed_url: lead.feed_url.clone(),
        itunes_id: lead.itunes_id,
        spotify_id: lead.spotify_id.clone(),
        total_episodes: lead.total_episodes,
        first_episode_date: lead
            .earliest_pub_date_ms
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        latest_episode_date: lead
            .latest_pub_date_ms
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        publishing_frequency_days: lead.update_frequency_hours.map(|h| h / 24.0),
        host_names: hints.host_names.clone(),
        rss_owner_name: None,
        rss_owner_email: None,
        rss_explicit: None,
        rss_categories: Vec::new(),
        primary_email: lead.email.clone(),
        podcast_twitter_url: twitter_winner,
        podcast_linkedin_url: linkedin_winner,
        podcast_instagram_url: instagram_winner,
        podcast_facebook_url: facebook_winner,
        podcast_youtube_url: youtube_winner,
        podcast_tiktok_url: tiktok_winner,
        podcast_other_social_url: lead.other_social_url.clone(),
        host_twitter_url: hints.host_twitter_url.clone(),
        host_linkedin_url: hints.host_linkedin_url.clone(),
        listen_score: lead.listen_score,
        listen_score_global_rank: lead.listen_score_global_rank.clone(),
        audience_size: lead.audience_size,
        itunes_rating_average: lead.itunes_rating_average,
        itunes_rating_count: lead.itunes_rating_count,
        spotify_rating_average: lead.spotify_rating_average,
        spotify_rating_count: lead.spotify_rating_count,
        reach,
        data_sources,
        last_enriched_at: now,
    };

    if let Some(rss) = rss {
        apply_rss(&mut profile, rss);
    }

    profile.data_sources.sort();
    profile.data_sources.dedup();
    profile
}

fn apply_rss(profile: &mut EnrichedProfile, rss: &RssFeedInfo) {
    profile.rss_owner_name = rss.owner_name.clone();
    profile.rss_owner_email = rss.owner_email.clone();
    profile.rss_explicit = rss.explicit;
    profile.rss_categories = rss.categories.clone();
    if profile.primary_email.is_none() {
        profile.primary_email = rss.owner_email.clone();
    }
    if profile.host_names.is_empty() {
        profile.host_names = rss.host_names.clone();
    }
    profile.data_sources.push("rss".to_string());
}

fn pick_winner(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .find(|url| url.starts_with("http://") || url.starts_with("https://"))
        .map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_lead_url_wins_over_hints() {
        let lead = UnifiedLead {
            twitter_url: Some("https://twitter.com/base".into()),
            ..Default::default()
        };
        let hints = EnrichmentHints {
            podcast_twitter_url: Some("https://twitter.com/hint".into()),
            ..Default::default()
        };
        let profile = merge_profile(&lead, &hints, &PlatformStatsMaps::default(), None, Utc::now());
        assert_eq!(profile.podcast_twitter_url.as_deref(), Some("https://twitter.com/base"));
    }

    #[test]
    fn podcast_hint_wins_over_host_hint_for_twitter() {
        let lead = UnifiedLead::default();
        let hints = EnrichmentHints {
            podcast_twitter_url: Some("https://twitter.com/podcast".into()),
            host_twitter_url: Some("https://twitter.com/host".into()),
            ..Default::default()
        };
        let profile = merge_profile(&lead, &hints, &PlatformStatsMaps::default(), None, Utc::now());
        assert_eq!(profile.podcast_twitter_url.as_deref(), Some("https://twitter.com/podcast"));
    }

    #[test]
    fn scraped_platforms_tag_data_sources_with_fixed_platform_names() {
        let lead = UnifiedLead {
            source_api: Some(leadgen_common::SourceApi::Listennotes),
            twitter_url: Some("https://twitter.com/show".into()),
            ..Default::default()
        };
        let hints = EnrichmentHints {
            podcast_linkedin_url: Some("https://linkedin.com/company/show".into()),
            ..Default::default()
        };
        let mut stats = PlatformStatsMaps::default();
        stats.twitter.insert(
            "https://twitter.com/show".to_string(),
            apify_client::TwitterProfileStats {
                followers_count: Some(1200),
                following_count: None,
                is_verified: Some(false),
            },
        );
        stats.linkedin.insert(
            "https://linkedin.com/company/show".to_string(),
            apify_client::LinkedInProfileStats {
                followers_count: None,
                connections_count: Some(500),
            },
        );

        let profile = merge_profile(&lead, &hints, &stats, None, Utc::now());
        assert_eq!(profile.reach.twitter_followers, Some(1200));
        assert_eq!(profile.reach.is_twitter_verified, Some(false));
        assert_eq!(profile.reach.linkedin_connections, Some(500));
        assert!(profile.data_sources.contains(&"apify_podcast_twitter".to_string()));
        assert!(profile.data_sources.contains(&"apify_host_linkedin".to_string()));
        assert!(profile.data_sources.contains(&"search_listennotes".to_string()));
        assert_eq!(profile.reach.instagram_followers, None);
    }
}
