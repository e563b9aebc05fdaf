use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::error::AiError;

use super::types::*;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

pub(crate) struct OpenRouterClient {
    api_key: String,
    http: reqwest::Client,
    app_name: Option<String>,
    site_url: Option<String>,
}

impl OpenRouterClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            app_name: None,
            site_url: None,
        }
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    pub fn with_site_url(mut self, url: &str) -> Self {
        self.site_url = Some(url.to_string());
        self
    }

    fn headers(&self) -> Result<HeaderMap, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| AiError::Request(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref url) = self.site_url {
            if let Ok(val) = HeaderValue::from_str(url) {
                headers.insert("HTTP-Referer", val);
            }
        }

        if let Some(ref name) = self.app_name {
            if let Ok(val) = HeaderValue::from_str(name) {
                headers.insert("X-Title", val);
            }
        }

        Ok(headers)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AiError> {
        let url = format!("{}/chat/completions", OPENROUTER_API_URL);

        debug!(model = %request.model, "OpenRouter chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    pub async fn structured_output(&self, request: &ChatRequest) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", OPENROUTER_API_URL);

        debug!(model = %request.model, "OpenRouter structured output request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AiError::EmptyResponse)
    }
}
