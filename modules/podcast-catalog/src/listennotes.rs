use leadgen_common::ProviderError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::retry::{AttemptOutcome, RetryPolicy};

const BASE_URL: &str = "https://listen-api.listennotes.com/api/v2";

/// Client for the ListenNotes podcast catalog API (Catalog-A in spec §4.1).
/// Grounded on the original's `api/listennotes_client.py`: header auth,
/// `/search` for keyword search, batch `/podcasts` POST for feed/iTunes ID
/// lookups, and `/podcasts/{id}/recommendations` for related-mode expansion.
pub struct ListenNotesClient {
    client: reqwest::Client,
    api_key: String,
    retry: RetryPolicy,
}

/// One row of a ListenNotes search or recommendation response. Field names
/// mirror the API's JSON exactly; `mappers::map_listennotes` converts this
/// into a [`leadgen_common::UnifiedLead`].
#[derive(Debug, Clone, Deserialize)]
pub struct ListenNotesPodcast {
    pub id: String,
    pub title: Option<String>,
    pub title_original: Option<String>,
    pub description: Option<String>,
    pub description_original: Option<String>,
    pub rss: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub itunes_id: Option<i64>,
    pub image: Option<String>,
    pub language: Option<String>,
    pub total_episodes: Option<i64>,
    pub latest_pub_date_ms: Option<i64>,
    pub earliest_pub_date_ms: Option<i64>,
    pub update_frequency_ms: Option<i64>,
    pub listen_score: Option<i64>,
    pub listen_score_global_rank: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<ListenNotesPodcast>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    podcasts: Vec<ListenNotesPodcast>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    recommendations: Vec<ListenNotesPodcast>,
}

impl ListenNotesClient {
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
                    .header("X-ListenAPI-Key", &self.api_key)
                    .query(query)
                    .timeout(std::time::Duration::from_secs(10))
                    .send()
                    .await?;
                classify(resp).await
            })
            .await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        self.retry
            .execute(|| async {
                let resp = self
                    .client
                    .post(format!("{BASE_URL}{path}"))
                    .header("X-ListenAPI-Key", &self.api_key)
                    .form(&form_from_json(body))
                    .timeout(std::time::Duration::from_secs(10))
                    .send()
                    .await?;
                classify(resp).await
            })
            .await
    }

    /// Keyword search, one page. `offset` paginates; results are sorted by
    /// publish date (`sort_by_date=1`) to match the original's default.
    pub async fn search_podcasts(
        &self,
        query: &str,
        offset: u32,
    ) -> Result<Vec<ListenNotesPodcast>, ProviderError> {
        let value = self
            .get(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("offset", offset.to_string()),
                    ("sort_by_date", "1".to_string()),
                    ("type", "podcast".to_string()),
                    ("language", "English".to_string()),
                ],
            )
            .await?;
        let parsed: SearchResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.results)
    }

    /// Batch lookup by RSS feed URL; the original expects exactly one match.
    pub async fn lookup_podcast_by_rss(
        &self,
        feed_url: &str,
    ) -> Result<Option<ListenNotesPodcast>, ProviderError> {
        let body = json!({ "rsses": [feed_url] });
        let value = self.post("/podcasts", &body).await?;
        let parsed: BatchResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.podcasts.into_iter().next())
    }

    /// Batch lookup by iTunes ID; verifies the returned `itunes_id` matches
    /// the request the same way the original does.
    pub async fn lookup_podcast_by_itunes_id(
        &self,
        itunes_id: i64,
    ) -> Result<Option<ListenNotesPodcast>, ProviderError> {
        let body = json!({ "itunes_ids": [itunes_id] });
        let value = self.post("/podcasts", &body).await?;
        let parsed: BatchResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed
            .podcasts
            .into_iter()
            .find(|p| p.itunes_id == Some(itunes_id)))
    }

    /// Related-podcast expansion for related-mode search (spec §4.2).
    pub async fn get_recommendations(
        &self,
        podcast_id: &str,
    ) -> Result<Vec<ListenNotesPodcast>, ProviderError> {
        let value = self
            .get(
                &format!("/podcasts/{podcast_id}/recommendations"),
                &[("safe_mode", "0".to_string())],
            )
            .await?;
        let parsed: RecommendationsResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.recommendations)
    }
}

/// ListenNotes' batch endpoint takes form-encoded arrays as comma-joined
/// strings, not JSON bodies; flatten our convenience `json!` shape into that.
fn form_from_json(body: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    if let Value::Object(map) = body {
        for (key, value) in map {
            match value {
                Value::Array(items) => {
                    let joined = items
                        .iter()
                        .map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(",");
                    out.push((key.clone(), joined));
                }
                Value::String(s) => out.push((key.clone(), s.clone())),
                other => out.push((key.clone(), other.to_string())),
            }
        }
    }
    out
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
    fn form_from_json_joins_arrays_with_commas() {
        let body = json!({ "rsses": ["https://a/rss", "https://b/rss"] });
        let form = form_from_json(&body);
        assert_eq!(
            form,
            vec![("rsses".to_string(), "https://a/rss,https://b/rss".to_string())]
        );
    }

    #[test]
    fn form_from_json_passes_scalars_through() {
        let body = json!({ "itunes_ids": [42] });
        let form = form_from_json(&body);
        assert_eq!(form, vec![("itunes_ids".to_string(), "42".to_string())]);
    }
}
