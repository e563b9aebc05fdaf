mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::json_schema_for;
use crate::traits::{GroundedAnswer, LlmClient};

use client::OpenAiClient;

/// OpenAI chat-completions backed client.
///
/// Implements both halves of [`LlmClient`]: structured extraction via the
/// `json_schema` response format, and grounded search as a best-effort
/// fallback when no online-capable model is configured (plain models have no
/// web access, so `grounded_search` here only ever returns an empty answer —
/// pair `OpenAi` with [`crate::OpenRouter`] when grounding matters).
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Type-safe structured output extraction.
    pub async fn extract<T: JsonSchema + DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Option<T>> {
        ai_client_extract::<T>(self, system_prompt, user_prompt).await
    }

    /// Plain chat completion, no schema constraint.
    pub async fn chat_completion(&self, system: &str, user: &str) -> Result<String> {
        let mut request = types::ChatRequest::new(&self.model)
            .message(types::WireMessage::system(system))
            .message(types::WireMessage::user(user));

        if types::uses_max_completion_tokens(&self.model) {
            request = request.max_completion_tokens(4096);
        } else {
            request = request.max_tokens(4096).temperature(0.0);
        }

        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from OpenAI"))
    }
}

async fn ai_client_extract<T: JsonSchema + DeserializeOwned>(
    ai: &OpenAi,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<Option<T>> {
    let schema = json_schema_for::<T>();
    let value = ai
        .extract_json(system_prompt, user_prompt, schema)
        .await?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[async_trait]
impl LlmClient for OpenAi {
    async fn grounded_search(&self, _query: &str) -> Result<GroundedAnswer> {
        // Plain chat-completions models have no web access; the combination
        // of providers the orchestrator wires up should prefer OpenRouter's
        // online models for this half of the interface.
        Ok(GroundedAnswer::default())
    }

    async fn extract_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Value,
    ) -> Result<Option<Value>> {
        let request = types::StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                types::WireMessage::system(system_prompt),
                types::WireMessage::user(user_prompt),
            ],
            temperature: if self.model.starts_with("gpt-5") {
                None
            } else {
                Some(0.0)
            },
            response_format: types::ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: types::JsonSchemaFormat {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                },
            },
        };

        let json_str = self.client().structured_output(&request).await?;
        Ok(serde_json::from_str(&json_str).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_model_and_key() {
        let ai = OpenAi::new("sk-test", "gpt-4o");
        assert_eq!(ai.model(), "gpt-4o");
    }

    #[test]
    fn with_base_url_overrides_default() {
        let ai = OpenAi::new("sk-test", "gpt-4o").with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url.as_deref(), Some("https://custom.api.com"));
    }
}
