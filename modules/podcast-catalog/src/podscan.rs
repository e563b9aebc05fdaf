use leadgen_common::ProviderError;
use serde::Deserialize;
use serde_json::Value;

use crate::retry::{AttemptOutcome, RetryPolicy};

const BASE_URL: &str = "https://podscan.fm/api/v1";

/// Client for the Podscan podcast catalog API (Catalog-B in spec §4.1).
/// Grounded on the original's `api/podscan_client.py`: bearer auth,
/// `/podcasts/search` for keyword search, `/podcasts/search/by/RSS` and
/// `/podcasts/search/by/itunesid` for single-record lookups, and
/// `/podcasts/{id}/related_podcasts` for related-mode expansion.
pub struct PodscanClient {
    client: reqwest::Client,
    api_key: String,
    retry: RetryPolicy,
}

/// One row of a Podscan search/lookup response. `reach.social_links` is
/// parsed separately by `mappers::map_podscan` since platform matching is
/// case-insensitive substring matching, not a fixed field name.
#[derive(Debug, Clone, Deserialize)]
pub struct PodscanPodcast {
    pub podcast_id: String,
    pub podcast_name: Option<String>,
    pub podcast_description: Option<String>,
    pub rss_url: Option<String>,
    pub podcast_url: Option<String>,
    pub podcast_email: Option<String>,
    #[serde(default, deserialize_with = "de_itunes_id")]
    pub podcast_itunes_id: Option<i64>,
    pub podcast_spotify_id: Option<String>,
    pub podcast_image_url: Option<String>,
    pub language: Option<String>,
    pub episode_count: Option<i64>,
    pub reach: Option<PodscanReach>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodscanReach {
    pub audience_size: Option<i64>,
    pub itunes_rating_average: Option<f64>,
    pub itunes_rating_count: Option<i64>,
    pub spotify_rating_average: Option<f64>,
    pub spotify_rating_count: Option<i64>,
    #[serde(default)]
    pub social_links: Vec<PodscanSocialLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodscanSocialLink {
    pub platform: String,
    pub url: String,
}

/// `podcast_itunes_id` arrives as either a string or a number depending on
/// the endpoint; normalize both to `i64`.
fn de_itunes_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    podcasts: Vec<PodscanPodcast>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ByRssResponse {
    Wrapped { podcasts: Vec<PodscanPodcast> },
    List(Vec<PodscanPodcast>),
}

#[derive(Debug, Deserialize)]
struct ByItunesIdResponse {
    podcast: PodscanPodcast,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedResponse {
    Wrapped { related_podcasts: Vec<PodscanPodcast> },
    List(Vec<PodscanPodcast>),
}

impl PodscanClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ProviderError> {
        self.retry
            .execute(|| async {
                let resp = self
                    .client
                    .get(format!("{BASE_URL}{path}"))
                    .bearer_auth(&self.api_key)
                    .query(query)
                    .timeout(std::time::Duration::from_secs(10))
                    .send()
                    .await?;
                classify(resp).await
            })
            .await
    }

    /// Keyword search, one page.
    pub async fn search_podcasts(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<PodscanPodcast>, ProviderError> {
        let value = self
            .get(
                "/podcasts/search",
                &[
                    ("query", query.to_string()),
                    ("per_page", "20".to_string()),
                    ("language", "en".to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;
        let parsed: SearchResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.podcasts)
    }

    /// Lookup by RSS feed URL. A 404 means "not found", not an error
    /// (mirrors the original's explicit handling).
    pub async fn search_podcast_by_rss(
        &self,
        feed_url: &str,
    ) -> Result<Option<PodscanPodcast>, ProviderError> {
        match self
            .get("/podcasts/search/by/RSS", &[("rss_feed", feed_url.to_string())])
            .await
        {
            Ok(value) => {
                let parsed: ByRssResponse = serde_json::from_value(value)
                    .map_err(|e| ProviderError::Parse(e.to_string()))?;
                let list = match parsed {
                    ByRssResponse::Wrapped { podcasts } => podcasts,
                    ByRssResponse::List(list) => list,
                };
                Ok(list.into_iter().next())
            }
            Err(ProviderError::ClientError { status: 404, .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Lookup by iTunes ID, verifying string equality the way the original does.
    pub async fn search_podcast_by_itunes_id(
        &self,
        itunes_id: i64,
    ) -> Result<Option<PodscanPodcast>, ProviderError> {
        match self
            .get(
                "/podcasts/search/by/itunesid",
                &[("itunes_id", itunes_id.to_string())],
            )
            .await
        {
            Ok(value) => {
                let parsed: ByItunesIdResponse = serde_json::from_value(value)
                    .map_err(|e| ProviderError::Parse(e.to_string()))?;
                if parsed.podcast.podcast_itunes_id == Some(itunes_id) {
                    Ok(Some(parsed.podcast))
                } else {
                    Ok(None)
                }
            }
            Err(ProviderError::ClientError { status: 404, .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Related-podcast expansion for related-mode search (spec §4.2).
    pub async fn get_related_podcasts(
        &self,
        podcast_id: &str,
    ) -> Result<Vec<PodscanPodcast>, ProviderError> {
        let value = self
            .get(&format!("/podcasts/{podcast_id}/related_podcasts"), &[])
            .await?;
        let parsed: RelatedResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(match parsed {
            RelatedResponse::Wrapped { related_podcasts } => related_podcasts,
            RelatedResponse::List(list) => list,
        })
    }
}

async fn classify(resp: reqwest::Response) -> Result<AttemptOutcome<Value>, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        let value: Value = resp.json().await?;
        return Ok(AttemptOutcome::Success(value));
    }
    let body = resp.text().await.unwrap_or_default();
    let code = status.as_u16();
    if code == 401 {
        return Ok(AttemptOutcome::Unauthorized(body));
    }
    if code == 429 {
        return Ok(AttemptOutcome::RateLimited { retry_after: None });
    }
    if status.is_server_error() {
        return Ok(AttemptOutcome::ServerError { status: code, body });
    }
    Ok(AttemptOutcome::ClientError { status: code, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_string_or_numeric_itunes_id() {
        let from_string: PodscanPodcast = serde_json::from_value(serde_json::json!({
            "podcast_id": "p1",
            "podcast_itunes_id": "12345"
        }))
        .unwrap();
        assert_eq!(from_string.podcast_itunes_id, Some(12345));

        let from_number: PodscanPodcast = serde_json::from_value(serde_json::json!({
            "podcast_id": "p2",
            "podcast_itunes_id": 6789
        }))
        .unwrap();
        assert_eq!(from_number.podcast_itunes_id, Some(6789));
    }

    #[test]
    fn handles_wrapped_and_bare_list_rss_response() {
        let wrapped: ByRssResponse = serde_json::from_value(serde_json::json!({
            "podcasts": [{"podcast_id": "p1"}]
        }))
        .unwrap();
        assert!(matches!(wrapped, ByRssResponse::Wrapped { podcasts } if podcasts.len() == 1));

        let bare: ByRssResponse =
            serde_json::from_value(serde_json::json!([{"podcast_id": "p1"}])).unwrap();
        assert!(matches!(bare, ByRssResponse::List(list) if list.len() == 1));
    }
}
