use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// A start URL entry for actors that take `startUrls`.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

// --- LinkedIn profile stats (supreme_coder/linkedin-profile-scraper) ---

#[derive(Debug, Clone, Serialize)]
pub struct LinkedInProfileInput {
    #[serde(rename = "findContacts")]
    pub find_contacts: bool,
    #[serde(rename = "scrapeCompany")]
    pub scrape_company: bool,
    pub urls: Vec<LinkedInUrlEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedInUrlEntry {
    pub url: String,
    pub method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedInProfileItem {
    #[serde(rename = "inputUrl")]
    pub input_url: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
    #[serde(rename = "connectionsCount")]
    pub connections_count: Option<i64>,
}

/// Normalized LinkedIn profile stats, keyed back to the original input URL.
#[derive(Debug, Clone, Default)]
pub struct LinkedInProfileStats {
    pub followers_count: Option<i64>,
    pub connections_count: Option<i64>,
}

// --- Twitter/X profile stats (apidojo/twitter-user-scraper) ---

#[derive(Debug, Clone, Serialize)]
pub struct TwitterProfileInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterProfileItem {
    pub url: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(rename = "followers")]
    pub followers_count: Option<i64>,
    #[serde(rename = "following")]
    pub following_count: Option<i64>,
    #[serde(rename = "isVerified")]
    pub is_verified: Option<bool>,
}

/// Normalized Twitter/X profile stats, keyed back to the original input URL.
#[derive(Debug, Clone, Default)]
pub struct TwitterProfileStats {
    pub followers_count: Option<i64>,
    pub following_count: Option<i64>,
    pub is_verified: Option<bool>,
}

// --- Instagram profile stats (apify/instagram-profile-scraper) ---

#[derive(Debug, Clone, Serialize)]
pub struct InstagramProfileInput {
    pub usernames: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramProfileItem {
    pub username: Option<String>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
}

/// Normalized Instagram profile stats, keyed back to the original input URL.
#[derive(Debug, Clone, Default)]
pub struct InstagramProfileStats {
    pub followers_count: Option<i64>,
}

// --- TikTok profile stats (apidojo/tiktok-scraper) ---

#[derive(Debug, Clone, Serialize)]
pub struct TikTokProfileInput {
    pub profiles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikTokProfileItem {
    #[serde(rename = "authorMeta")]
    pub author_meta: Option<TikTokAuthorMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikTokAuthorMeta {
    pub name: Option<String>,
    #[serde(rename = "fans")]
    pub followers_count: Option<i64>,
}

/// Normalized TikTok profile stats, keyed back to the original input URL.
#[derive(Debug, Clone, Default)]
pub struct TikTokProfileStats {
    pub followers_count: Option<i64>,
}
