use std::collections::{HashMap, HashSet};

use apify_client::{ApifyClient, InstagramProfileStats, LinkedInProfileStats, TikTokProfileStats, TwitterProfileStats};
use leadgen_common::{canonicalize_twitter_url, canonicalize_url, UnifiedLead};

use super::hints::EnrichmentHints;

/// The six platform URL sets collected between Phase 1 and Phase 2 (spec
/// §4.6). Facebook and YouTube have no batch-stats actor in this pipeline
/// (mirroring the original, which only URL-passes-through those two), so
/// their sets exist purely to carry winning URLs into Phase 3 — no scraper
/// call is made for them.
#[derive(Default)]
pub struct PlatformUrlSets {
    pub twitter: HashSet<String>,
    pub linkedin: HashSet<String>,
    pub instagram: HashSet<String>,
    pub facebook: HashSet<String>,
    pub youtube: HashSet<String>,
    pub tiktok: HashSet<String>,
}

/// Results of the batched scrapes: canonical URL -> platform stats.
#[derive(Default)]
pub struct PlatformStatsMaps {
    pub twitter: HashMap<String, TwitterProfileStats>,
    pub linkedin: HashMap<String, LinkedInProfileStats>,
    pub instagram: HashMap<String, InstagramProfileStats>,
    pub tiktok: HashMap<String, TikTokProfileStats>,
}

/// Collect the union of candidate URLs per platform across every lead's
/// base fields and Phase 1 hints, canonicalized before insertion so the
/// sets dedupe correctly.
pub fn collect_platform_urls(leads: &[(UnifiedLead, EnrichmentHints)]) -> PlatformUrlSets {
    let mut sets = PlatformUrlSets::default();

    for (lead, hints) in leads {
        insert_twitter(&mut sets.twitter, lead.twitter_url.as_deref());
        insert_twitter(&mut sets.twitter, hints.podcast_twitter_url.as_deref());
        insert_twitter(&mut sets.twitter, hints.host_twitter_url.as_deref());

        insert_plain(&mut sets.linkedin, lead.linkedin_url.as_deref());
        insert_plain(&mut sets.linkedin, hints.podcast_linkedin_url.as_deref());
        insert_plain(&mut sets.linkedin, hints.host_linkedin_url.as_deref());

        insert_plain(&mut sets.instagram, lead.instagram_url.as_deref());
        insert_plain(&mut sets.instagram, hints.podcast_instagram_url.as_deref());

        insert_plain(&mut sets.facebook, lead.facebook_url.as_deref());
        insert_plain(&mut sets.facebook, hints.podcast_facebook_url.as_deref());

        insert_plain(&mut sets.youtube, lead.youtube_url.as_deref());
        insert_plain(&mut sets.youtube, hints.podcast_youtube_url.as_deref());

        insert_plain(&mut sets.tiktok, lead.tiktok_url.as_deref());
        insert_plain(&mut sets.tiktok, hints.podcast_tiktok_url.as_deref());
    }

    sets
}

fn insert_twitter(set: &mut HashSet<String>, url: Option<&str>) {
    if let Some(url) = url {
        if let Some(canonical) = canonicalize_twitter_url(url) {
            set.insert(canonical);
        }
    }
}

fn insert_plain(set: &mut HashSet<String>, url: Option<&str>) {
    if let Some(url) = url {
        if let Some(canonical) = canonicalize_url(url) {
            set.insert(canonical);
        }
    }
}

/// Run the four batch scrapers (Twitter/LinkedIn/Instagram/TikTok) against
/// the collected URL sets. Each set is submitted independently; an empty
/// set skips its call entirely.
pub async fn run_scrapers(client: &ApifyClient, sets: &PlatformUrlSets) -> PlatformStatsMaps {
    let twitter_urls: Vec<String> = sets.twitter.iter().cloned().collect();
    let linkedin_urls: Vec<String> = sets.linkedin.iter().cloned().collect();
    let instagram_urls: Vec<String> = sets.instagram.iter().cloned().collect();
    let tiktok_urls: Vec<String> = sets.tiktok.iter().cloned().collect();

    let (twitter, linkedin, instagram, tiktok) = tokio::join!(
        client.get_twitter_profile_stats(&twitter_urls),
        client.get_linkedin_profile_stats(&linkedin_urls),
        client.get_instagram_profile_stats(&instagram_urls),
        client.get_tiktok_profile_stats(&tiktok_urls),
    );

    PlatformStatsMaps {
        twitter: twitter.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "twitter batch scrape failed");
            HashMap::new()
        }),
        linkedin: linkedin.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "linkedin batch scrape failed");
            HashMap::new()
        }),
        instagram: instagram.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "instagram batch scrape failed");
            HashMap::new()
        }),
        tiktok: tiktok.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "tiktok batch scrape failed");
            HashMap::new()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_deduped_canonical_urls_across_leads() {
        let lead_a = UnifiedLead {
            twitter_url: Some("https://x.com/Show".into()),
            ..Default::default()
        };
        let lead_b = UnifiedLead::default();
        let hints_b = EnrichmentHints {
            podcast_twitter_url: Some("https://twitter.com/show".into()),
            ..Default::default()
        };

        let sets = collect_platform_urls(&[
            (lead_a, EnrichmentHints::default()),
            (lead_b, hints_b),
        ]);

        assert_eq!(sets.twitter.len(), 1);
        assert!(sets.twitter.contains("https://twitter.com/show"));
    }
}
