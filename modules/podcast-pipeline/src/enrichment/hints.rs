use schemars::JsonSchema;
use serde::Deserialize;

/// Structured output schema for Phase 1 discovery (spec §4.6 step 3): eight
/// social URL slots plus host names. The extractor is instructed to emit
/// null for anything not clearly present in its context, never a guess.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct EnrichmentHints {
    pub host_names: Vec<String>,
    pub podcast_twitter_url: Option<String>,
    pub podcast_linkedin_url: Option<String>,
    pub podcast_instagram_url: Option<String>,
    pub podcast_facebook_url: Option<String>,
    pub podcast_youtube_url: Option<String>,
    pub podcast_tiktok_url: Option<String>,
    pub host_twitter_url: Option<String>,
    pub host_linkedin_url: Option<String>,
}

/// One discovery target probed in Phase 1: a field name (for the grounded
/// search query template) and whether it's already satisfied by the base
/// lead, in which case no search is issued for it.
pub struct DiscoveryTarget {
    pub field: &'static str,
    pub query_template: &'static str,
}

pub const DISCOVERY_TARGETS: &[DiscoveryTarget] = &[
    DiscoveryTarget {
        field: "podcast_twitter_url",
        query_template: "official Twitter/X URL for the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "podcast_linkedin_url",
        query_template: "official LinkedIn page URL for the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "podcast_instagram_url",
        query_template: "official Instagram URL for the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "podcast_facebook_url",
        query_template: "official Facebook page URL for the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "podcast_youtube_url",
        query_template: "official YouTube channel URL for the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "podcast_tiktok_url",
        query_template: "official TikTok URL for the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "host_twitter_url",
        query_template: "Twitter/X URL for the host of the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "host_linkedin_url",
        query_template: "LinkedIn URL for the host of the podcast \"{title}\"",
    },
    DiscoveryTarget {
        field: "host_names",
        query_template: "name of the host or hosts of the podcast \"{title}\"",
    },
];
