pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    InstagramProfileStats, LinkedInProfileStats, RunData, TikTokProfileStats, TwitterProfileStats,
};

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use types::{
    ApiResponse, InstagramProfileInput, InstagramProfileItem, LinkedInProfileInput,
    LinkedInProfileItem, LinkedInUrlEntry, StartUrl, TikTokAuthorMeta, TikTokProfileInput,
    TikTokProfileItem, TwitterProfileInput, TwitterProfileItem,
};

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor slug for supreme_coder/linkedin-profile-scraper.
const LINKEDIN_PROFILE_SCRAPER: &str = "supreme_coder/linkedin-profile-scraper";

/// Actor slug for apidojo/twitter-user-scraper.
const TWITTER_PROFILE_SCRAPER: &str = "apidojo/twitter-user-scraper";

/// Actor slug for apify/instagram-profile-scraper.
const INSTAGRAM_PROFILE_SCRAPER: &str = "apify/instagram-profile-scraper";

/// Actor slug for apidojo/tiktok-scraper.
const TIKTOK_PROFILE_SCRAPER: &str = "apidojo/tiktok-scraper";

/// Minimum batch size the Twitter actor accepts before its results
/// degrade in quality; padded with well-known public profiles when the
/// caller supplies fewer URLs.
const TWITTER_MIN_BATCH_SIZE: usize = 5;

/// Public profiles used to pad small Twitter batches, in call order.
const TWITTER_PADDING_PROFILES: &[&str] = &["nasa", "bbcworld", "github", "teslamotors", "apify"];

/// Delay between sequential TikTok profile calls (the actor has no
/// multi-profile batch mode).
const TIKTOK_CALL_DELAY: Duration = Duration::from_secs(1);

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    async fn start_run<I: Serialize>(&self, actor: &str, input: &I) -> Result<RunData> {
        let actor_path = actor.replace('/', "~");
        let url = format!("{BASE_URL}/acts/{actor_path}/runs");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{BASE_URL}/actor-runs/{run_id}?waitForFinish=60");
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{BASE_URL}/datasets/{dataset_id}/items?format=json");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    async fn run_actor_for_items<I: Serialize, T: DeserializeOwned>(
        &self,
        actor: &str,
        input: &I,
    ) -> Result<Vec<T>> {
        let run = self.start_run(actor, input).await?;
        let completed = self.wait_for_run(&run.id).await?;
        self.get_dataset_items(&completed.default_dataset_id).await
    }

    /// Fetch follower/connection counts for a batch of LinkedIn profile
    /// URLs. Missing or unmatched URLs are absent from the returned map.
    pub async fn get_linkedin_profile_stats(
        &self,
        profile_urls: &[String],
    ) -> Result<HashMap<String, LinkedInProfileStats>> {
        if profile_urls.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::info!(count = profile_urls.len(), "fetching LinkedIn profile stats");

        let input = LinkedInProfileInput {
            find_contacts: false,
            scrape_company: false,
            urls: profile_urls
                .iter()
                .map(|url| LinkedInUrlEntry {
                    url: url.clone(),
                    method: "GET".to_string(),
                })
                .collect(),
        };

        let items: Vec<LinkedInProfileItem> = self
            .run_actor_for_items(LINKEDIN_PROFILE_SCRAPER, &input)
            .await?;

        let mut by_url = HashMap::new();
        for item in items {
            if let Some(url) = item.input_url.clone() {
                by_url.insert(
                    url,
                    LinkedInProfileStats {
                        followers_count: item.followers_count,
                        connections_count: item.connections_count,
                    },
                );
            }
        }
        tracing::info!(count = by_url.len(), "fetched LinkedIn profile stats");
        Ok(by_url)
    }

    /// Fetch follower counts for a batch of Twitter/X profile URLs. The
    /// actor degrades below a 5-URL batch, so small batches are padded
    /// with well-known public profiles; padding-only results never reach
    /// the returned map.
    pub async fn get_twitter_profile_stats(
        &self,
        profile_urls: &[String],
    ) -> Result<HashMap<String, TwitterProfileStats>> {
        if profile_urls.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::info!(count = profile_urls.len(), "fetching Twitter profile stats");

        let mut requested: Vec<String> = profile_urls.to_vec();
        let mut padding_urls = Vec::new();
        let mut pad_idx = 0;
        while requested.len() < TWITTER_MIN_BATCH_SIZE && pad_idx < TWITTER_PADDING_PROFILES.len() {
            let handle = TWITTER_PADDING_PROFILES[pad_idx];
            let padding_url = format!("https://twitter.com/{handle}");
            if !requested.iter().any(|u| u.eq_ignore_ascii_case(&padding_url)) {
                padding_urls.push(padding_url.clone());
                requested.push(padding_url);
            }
            pad_idx += 1;
        }

        let input = TwitterProfileInput {
            start_urls: requested.iter().map(|u| StartUrl { url: u.clone() }).collect(),
        };

        let items: Vec<TwitterProfileItem> = self
            .run_actor_for_items(TWITTER_PROFILE_SCRAPER, &input)
            .await?;

        let mut by_url = HashMap::new();
        for item in items {
            let matched_url = item
                .url
                .as_deref()
                .and_then(|url| profile_urls.iter().find(|u| u.eq_ignore_ascii_case(url)))
                .or_else(|| {
                    item.user_name.as_deref().and_then(|name| {
                        profile_urls
                            .iter()
                            .find(|u| u.to_lowercase().ends_with(&name.to_lowercase()))
                    })
                });

            if let Some(original_url) = matched_url {
                if padding_urls.iter().any(|p| p.eq_ignore_ascii_case(original_url)) {
                    continue;
                }
                by_url.insert(
                    original_url.clone(),
                    TwitterProfileStats {
                        followers_count: item.followers_count,
                        following_count: item.following_count,
                        is_verified: item.is_verified,
                    },
                );
            }
        }
        tracing::info!(count = by_url.len(), "fetched Twitter profile stats");
        Ok(by_url)
    }

    /// Fetch follower counts for a batch of Instagram profile URLs.
    /// Usernames that cannot be extracted from a URL are skipped.
    pub async fn get_instagram_profile_stats(
        &self,
        profile_urls: &[String],
    ) -> Result<HashMap<String, InstagramProfileStats>> {
        if profile_urls.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::info!(count = profile_urls.len(), "fetching Instagram profile stats");

        let mut username_to_url = HashMap::new();
        for url in profile_urls {
            if let Some(username) = extract_instagram_username(url) {
                username_to_url.entry(username).or_insert_with(|| url.clone());
            }
        }

        if username_to_url.is_empty() {
            return Ok(HashMap::new());
        }

        let mut usernames: Vec<String> = username_to_url.keys().cloned().collect();
        usernames.sort();

        let input = InstagramProfileInput { usernames };

        let items: Vec<InstagramProfileItem> = self
            .run_actor_for_items(INSTAGRAM_PROFILE_SCRAPER, &input)
            .await?;

        let mut by_url = HashMap::new();
        for item in items {
            if let Some(username) = item.username.clone() {
                if let Some(url) = username_to_url.get(&username) {
                    by_url.insert(
                        url.clone(),
                        InstagramProfileStats {
                            followers_count: item.followers_count,
                        },
                    );
                }
            }
        }
        tracing::info!(count = by_url.len(), "fetched Instagram profile stats");
        Ok(by_url)
    }

    /// Fetch follower counts for a batch of TikTok profile URLs. The
    /// actor has no multi-profile input, so each URL is run in its own
    /// call with a 1s delay between calls.
    pub async fn get_tiktok_profile_stats(
        &self,
        profile_urls: &[String],
    ) -> Result<HashMap<String, TikTokProfileStats>> {
        let mut by_url = HashMap::new();
        if profile_urls.is_empty() {
            return Ok(by_url);
        }

        tracing::info!(count = profile_urls.len(), "fetching TikTok profile stats");

        for (idx, url) in profile_urls.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(TIKTOK_CALL_DELAY).await;
            }
            let input = TikTokProfileInput {
                profiles: vec![url.clone()],
            };
            let items: Vec<TikTokProfileItem> = self
                .run_actor_for_items(TIKTOK_PROFILE_SCRAPER, &input)
                .await?;
            if let Some(TikTokAuthorMeta { followers_count, .. }) =
                items.into_iter().find_map(|item| item.author_meta)
            {
                by_url.insert(
                    url.clone(),
                    TikTokProfileStats {
                        followers_count,
                    },
                );
            }
        }

        tracing::info!(count = by_url.len(), "fetched TikTok profile stats");
        Ok(by_url)
    }
}

fn extract_instagram_username(url: &str) -> Option<String> {
    let after = url.split("instagram.com/").nth(1)?;
    let username = after.split('/').next()?.split('?').next()?;
    if username.is_empty() {
        None
    } else {
        Some(username.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_instagram_username_from_various_forms() {
        assert_eq!(
            extract_instagram_username("https://instagram.com/someshow/"),
            Some("someshow".to_string())
        );
        assert_eq!(
            extract_instagram_username("https://www.instagram.com/someshow?hl=en"),
            Some("someshow".to_string())
        );
        assert_eq!(extract_instagram_username("https://example.com/nope"), None);
    }
}
