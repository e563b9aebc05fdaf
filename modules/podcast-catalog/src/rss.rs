use feed_rs::model::Feed;
use leadgen_common::ProviderError;
use regex::Regex;
use std::sync::OnceLock;

/// Feed-level metadata pulled from an RSS/Atom document for Enrichment's
/// optional RSS pass (spec §4.3, gated by `Config.rss_enrichment_enabled`).
/// Grounded on the original's `agents/enrichment/rss_parser.py`, adapted to
/// `feed-rs`'s generic model — the same style `rootsignal-archive`'s
/// `FeedService` uses to fetch and parse feeds.
#[derive(Debug, Clone, Default)]
pub struct RssFeedInfo {
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub explicit: Option<bool>,
    pub categories: Vec<String>,
    pub host_names: Vec<String>,
}

pub struct RssParser {
    client: reqwest::Client,
}

impl Default for RssParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RssParser {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("reqwest client builds"),
        }
    }

    /// Fetch and parse a feed, returning owner/host/category metadata.
    pub async fn fetch(&self, feed_url: &str) -> Result<RssFeedInfo, ProviderError> {
        let resp = self.client.get(feed_url).send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::ClientError {
                status: resp.status().as_u16(),
                body: String::new(),
            });
        }
        let bytes = resp.bytes().await?;
        let feed = feed_rs::parser::parse(&bytes[..])
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(extract_feed_info(&feed))
    }
}

fn extract_feed_info(feed: &Feed) -> RssFeedInfo {
    let host_names: Vec<String> = feed.authors.iter().map(|a| a.name.clone()).collect();

    let owner_email = feed
        .authors
        .iter()
        .find_map(|a| a.email.clone())
        .or_else(|| feed.contributors.iter().find_map(|c| c.email.clone()));

    let owner_name = host_names.first().cloned();

    let categories: Vec<String> = feed.categories.iter().map(|c| c.term.clone()).collect();

    let explicit = feed
        .rights
        .as_ref()
        .map(|t| t.content.clone())
        .and_then(|content| explicit_regex().captures(&content))
        .map(|caps| caps[1].eq_ignore_ascii_case("yes") || &caps[1] == "true");

    RssFeedInfo {
        owner_name,
        owner_email,
        explicit,
        categories,
        host_names,
    }
}

fn explicit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)explicit[\"':>\s]+(yes|no|true|false)").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Sample Show</title>
    <link>https://example.com</link>
    <itunes:author>Jane Host</itunes:author>
    <itunes:category text="Technology"/>
    <item>
      <title>Episode 1</title>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn extracts_host_name_and_categories_from_feed() {
        let feed = feed_rs::parser::parse(SAMPLE_FEED.as_bytes()).unwrap();
        let info = extract_feed_info(&feed);
        assert_eq!(info.host_names, vec!["Jane Host".to_string()]);
        assert_eq!(info.owner_name.as_deref(), Some("Jane Host"));
        assert!(info.categories.iter().any(|c| c == "Technology"));
    }
}
