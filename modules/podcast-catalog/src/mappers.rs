use leadgen_common::{SourceApi, UnifiedLead};

use crate::listennotes::ListenNotesPodcast;
use crate::podscan::PodscanPodcast;

/// Map a ListenNotes result into a [`UnifiedLead`]. Mirrors
/// `services/result_standardizer.py`'s `ListenNotesResultMapper`: prefers
/// the `_original` title/description variants, and leaves every
/// Podscan-only field (spotify_id, audience_size, ratings, socials) null.
pub fn map_listennotes(result: &ListenNotesPodcast) -> UnifiedLead {
    UnifiedLead {
        source_api: Some(SourceApi::Listennotes),
        api_id: result.id.clone(),
        feed_url: result.rss.clone(),
        itunes_id: result.itunes_id,
        spotify_id: None,
        website: result.website.clone(),

        title: result
            .title_original
            .clone()
            .or_else(|| result.title.clone()),
        description: result
            .description_original
            .clone()
            .or_else(|| result.description.clone()),
        image_url: result.image.clone(),
        language: result.language.clone(),

        total_episodes: result.total_episodes,
        latest_pub_date_ms: result.latest_pub_date_ms,
        earliest_pub_date_ms: result.earliest_pub_date_ms,
        update_frequency_hours: result
            .update_frequency_ms
            .map(|ms| ms as f64 / 3_600_000.0),

        listen_score: result.listen_score,
        listen_score_global_rank: result.listen_score_global_rank.clone(),
        audience_size: None,
        itunes_rating_average: None,
        itunes_rating_count: None,
        spotify_rating_average: None,
        spotify_rating_count: None,

        twitter_url: None,
        linkedin_url: None,
        instagram_url: None,
        facebook_url: None,
        youtube_url: None,
        tiktok_url: None,
        other_social_url: None,

        email: result.email.clone(),
    }
}

/// Map a Podscan result into a [`UnifiedLead`]. Mirrors
/// `services/result_standardizer.py`'s `PodscanResultMapper`: parses
/// `reach.social_links` by case-insensitive substring match against each
/// known platform name, first match wins per platform, and any link that
/// doesn't match a known platform overflows into `other_social_url` (first
/// unmatched link only). Leaves every ListenNotes-only field
/// (episode/listen-score timing data) null.
pub fn map_podscan(result: &PodscanPodcast) -> UnifiedLead {
    let mut lead = UnifiedLead {
        source_api: Some(SourceApi::Podscan),
        api_id: result.podcast_id.clone(),
        feed_url: result.rss_url.clone(),
        itunes_id: result.podcast_itunes_id,
        spotify_id: result.podcast_spotify_id.clone(),
        website: result.podcast_url.clone(),

        title: result.podcast_name.clone(),
        description: result.podcast_description.clone(),
        image_url: result.podcast_image_url.clone(),
        language: result.language.clone(),

        total_episodes: result.episode_count,
        latest_pub_date_ms: None,
        earliest_pub_date_ms: None,
        update_frequency_hours: None,

        listen_score: None,
        listen_score_global_rank: None,
        audience_size: result.reach.as_ref().and_then(|r| r.audience_size),
        itunes_rating_average: result.reach.as_ref().and_then(|r| r.itunes_rating_average),
        itunes_rating_count: result.reach.as_ref().and_then(|r| r.itunes_rating_count),
        spotify_rating_average: result.reach.as_ref().and_then(|r| r.spotify_rating_average),
        spotify_rating_count: result.reach.as_ref().and_then(|r| r.spotify_rating_count),

        twitter_url: None,
        linkedin_url: None,
        instagram_url: None,
        facebook_url: None,
        youtube_url: None,
        tiktok_url: None,
        other_social_url: None,

        email: result.podcast_email.clone(),
    };

    if let Some(reach) = &result.reach {
        assign_social_links(&mut lead, &reach.social_links);
    }

    lead
}

/// Platform match order matters only in that each platform keeps its first
/// match; overflow collects the first link that matched no platform.
fn assign_social_links(lead: &mut UnifiedLead, links: &[crate::podscan::PodscanSocialLink]) {
    for link in links {
        let platform = link.platform.to_lowercase();
        if platform.contains("twitter") || platform == "x" {
            if lead.twitter_url.is_none() {
                lead.twitter_url = Some(link.url.clone());
                continue;
            }
        } else if platform.contains("linkedin") {
            if lead.linkedin_url.is_none() {
                lead.linkedin_url = Some(link.url.clone());
                continue;
            }
        } else if platform.contains("instagram") {
            if lead.instagram_url.is_none() {
                lead.instagram_url = Some(link.url.clone());
                continue;
            }
        } else if platform.contains("facebook") {
            if lead.facebook_url.is_none() {
                lead.facebook_url = Some(link.url.clone());
                continue;
            }
        } else if platform.contains("youtube") {
            if lead.youtube_url.is_none() {
                lead.youtube_url = Some(link.url.clone());
                continue;
            }
        } else if platform.contains("tiktok") {
            if lead.tiktok_url.is_none() {
                lead.tiktok_url = Some(link.url.clone());
                continue;
            }
        } else if lead.other_social_url.is_none() {
            lead.other_social_url = Some(link.url.clone());
            continue;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::podscan::{PodscanReach, PodscanSocialLink};

    #[test]
    fn listennotes_mapper_prefers_original_title_and_description() {
        let result = ListenNotesPodcast {
            id: "ln1".into(),
            title: Some("Title".into()),
            title_original: Some("Title Orig".into()),
            description: Some("Desc".into()),
            description_original: Some("Desc Orig".into()),
            rss: Some("https://feed".into()),
            website: None,
            email: None,
            itunes_id: Some(42),
            image: None,
            language: None,
            total_episodes: Some(10),
            latest_pub_date_ms: None,
            earliest_pub_date_ms: None,
            update_frequency_ms: Some(7_200_000),
            listen_score: Some(80),
            listen_score_global_rank: None,
        };
        let lead = map_listennotes(&result);
        assert_eq!(lead.title.as_deref(), Some("Title Orig"));
        assert_eq!(lead.description.as_deref(), Some("Desc Orig"));
        assert_eq!(lead.update_frequency_hours, Some(2.0));
        assert_eq!(lead.audience_size, None);
    }

    #[test]
    fn podscan_mapper_assigns_social_links_first_match_wins() {
        let result = PodscanPodcast {
            podcast_id: "ps1".into(),
            podcast_name: Some("Show".into()),
            podcast_description: None,
            rss_url: Some("https://feed".into()),
            podcast_url: None,
            podcast_email: None,
            podcast_itunes_id: None,
            podcast_spotify_id: Some("spot1".into()),
            podcast_image_url: None,
            language: None,
            episode_count: None,
            reach: Some(PodscanReach {
                audience_size: Some(1000),
                itunes_rating_average: None,
                itunes_rating_count: None,
                spotify_rating_average: None,
                spotify_rating_count: None,
                social_links: vec![
                    PodscanSocialLink {
                        platform: "Instagram".into(),
                        url: "https://instagram.com/show".into(),
                    },
                    PodscanSocialLink {
                        platform: "Instagram Business".into(),
                        url: "https://instagram.com/show2".into(),
                    },
                    PodscanSocialLink {
                        platform: "Discord".into(),
                        url: "https://discord.gg/show".into(),
                    },
                ],
            }),
        };
        let lead = map_podscan(&result);
        assert_eq!(lead.instagram_url.as_deref(), Some("https://instagram.com/show"));
        assert_eq!(lead.other_social_url.as_deref(), Some("https://discord.gg/show"));
        assert_eq!(lead.spotify_id.as_deref(), Some("spot1"));
        assert_eq!(lead.audience_size, Some(1000));
    }
}
