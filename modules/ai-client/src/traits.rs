use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A grounded web-search answer: a short synthesized answer plus the raw
/// snippets it was built from. Snippets are used as fallback context when
/// the provider has no single direct answer for the query.
#[derive(Debug, Clone, Default)]
pub struct GroundedAnswer {
    pub answer: Option<String>,
    pub snippets: Vec<String>,
}

impl GroundedAnswer {
    /// The best available text: the direct answer if present, else snippets
    /// joined by newlines. Empty string if nothing was found.
    pub fn best_text(&self) -> String {
        if let Some(answer) = &self.answer {
            if !answer.trim().is_empty() {
                return answer.clone();
            }
        }
        self.snippets.join("\n")
    }
}

/// Two capabilities every supported LLM provider exposes, kept behind one
/// trait so campaigns can switch models/providers without touching callers:
///
/// - `grounded_search`: free-form generation augmented with live web search,
///   used to fetch a fact the model doesn't already know.
/// - `extract_json`: generation constrained to a JSON schema, used to parse
///   assembled context into a typed record. Must fail closed: malformed or
///   schema-violating output is `Ok(None)`, never a partially populated value.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn grounded_search(&self, query: &str) -> Result<GroundedAnswer>;

    async fn extract_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Value,
    ) -> Result<Option<Value>>;
}

/// Convenience wrapper over [`LlmClient::extract_json`] for a concrete,
/// schema-derived type. Deserialization failure is treated the same as a
/// provider-side schema violation: `Ok(None)`, not an error.
pub async fn extract<T>(
    client: &(dyn LlmClient + Send + Sync),
    system_prompt: &str,
    user_prompt: &str,
) -> Result<Option<T>>
where
    T: JsonSchema + DeserializeOwned,
{
    let schema = crate::schema::json_schema_for::<T>();
    let Some(value) = client
        .extract_json(system_prompt, user_prompt, schema)
        .await?
    else {
        return Ok(None);
    };
    Ok(serde_json::from_value(value).ok())
}
