use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Catalog providers
    pub listennotes_api_key: String,
    pub podscan_api_key: String,

    // LLM provider (OpenAI or OpenRouter, selected by whichever key is set)
    pub openai_api_key: String,
    pub openrouter_api_key: String,
    pub llm_model: String,

    // Scraping
    pub apify_api_key: String,

    // Artifacts
    pub data_dir: String,

    // Feature toggles
    pub rss_enrichment_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if a required var is missing.
    pub fn from_env() -> Self {
        Self {
            listennotes_api_key: required_env("LISTENNOTES_API_KEY"),
            podscan_api_key: required_env("PODSCAN_API_KEY"),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            apify_api_key: required_env("APIFY_API_KEY"),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data/campaigns".to_string()),
            rss_enrichment_enabled: env::var("RSS_ENRICHMENT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Log the presence (never the value) of each sensitive env var.
    pub fn log_redacted(&self) {
        let vars = [
            ("LISTENNOTES_API_KEY", &self.listennotes_api_key),
            ("PODSCAN_API_KEY", &self.podscan_api_key),
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("OPENROUTER_API_KEY", &self.openrouter_api_key),
            ("APIFY_API_KEY", &self.apify_api_key),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
        tracing::info!(
            data_dir = %self.data_dir,
            rss_enrichment_enabled = self.rss_enrichment_enabled,
            "config loaded"
        );
    }

    /// Whether an online-capable (grounded search) LLM key is configured.
    pub fn has_llm_key(&self) -> bool {
        !self.openai_api_key.is_empty() || !self.openrouter_api_key.is_empty()
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_redacted_does_not_panic_on_empty_config() {
        let cfg = Config {
            listennotes_api_key: "key".into(),
            podscan_api_key: "key".into(),
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            llm_model: "gpt-4o-mini".into(),
            apify_api_key: "key".into(),
            data_dir: "data/campaigns".into(),
            rss_enrichment_enabled: false,
        };
        cfg.log_redacted();
        assert!(!cfg.has_llm_key());
    }
}
