mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::traits::{extract as extract_via_trait, GroundedAnswer, LlmClient};

use client::OpenRouterClient;

/// OpenRouter-backed client. Unlike [`crate::OpenAi`], OpenRouter fronts
/// many providers and exposes a hosted web-search plugin, so this is the
/// intended implementation of [`LlmClient::grounded_search`] in a deployment
/// that wires up both providers.
#[derive(Clone)]
pub struct OpenRouter {
    api_key: String,
    model: String,
    app_name: Option<String>,
    site_url: Option<String>,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            app_name: None,
            site_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| anyhow!("OPENROUTER_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenRouterClient {
        let mut client = OpenRouterClient::new(&self.api_key);
        if let Some(ref name) = self.app_name {
            client = client.with_app_name(name);
        }
        if let Some(ref url) = self.site_url {
            client = client.with_site_url(url);
        }
        client
    }

    /// Type-safe structured output extraction.
    pub async fn extract<T: JsonSchema + DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Option<T>> {
        extract_via_trait::<T>(self, system_prompt, user_prompt).await
    }
}

#[async_trait]
impl LlmClient for OpenRouter {
    /// Appends `:online` to the configured model id, which routes the
    /// request through OpenRouter's hosted web-search plugin. The model's
    /// own answer becomes `answer`; the pages it cited become `snippets`,
    /// used when the answer text alone doesn't carry enough detail.
    async fn grounded_search(&self, query: &str) -> Result<GroundedAnswer> {
        let online_model = format!("{}:online", self.model);
        let request = types::ChatRequest::new(online_model)
            .message(types::WireMessage::system(
                "Answer the question using current web search results. Be concise and factual.",
            ))
            .message(types::WireMessage::user(query))
            .temperature(0.0)
            .max_tokens(1024);

        let response = self.client().chat(&request).await?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Ok(GroundedAnswer::default());
        };

        let snippets = choice
            .message
            .annotations
            .iter()
            .filter(|a| a.annotation_type == "url_citation")
            .filter_map(|a| a.url_citation.as_ref())
            .filter_map(|c| c.content.clone().or_else(|| c.title.clone()))
            .collect();

        Ok(GroundedAnswer {
            answer: choice.message.content,
            snippets,
        })
    }

    async fn extract_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Value,
    ) -> Result<Option<Value>> {
        let request = types::ChatRequest::new(self.model.clone())
            .message(types::WireMessage::system(system_prompt))
            .message(types::WireMessage::user(user_prompt))
            .temperature(0.0)
            .response_format(types::ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: types::JsonSchemaFormat {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                },
            });

        let json_str = self.client().structured_output(&request).await?;
        Ok(serde_json::from_str(&json_str).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_model_and_key() {
        let or = OpenRouter::new("sk-test", "anthropic/claude-3.5-sonnet");
        assert_eq!(or.model(), "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn with_app_name_and_site_url_are_stored() {
        let or = OpenRouter::new("sk-test", "gpt-4o")
            .with_app_name("leadgen")
            .with_site_url("https://example.com");
        assert_eq!(or.app_name.as_deref(), Some("leadgen"));
        assert_eq!(or.site_url.as_deref(), Some("https://example.com"));
    }
}
