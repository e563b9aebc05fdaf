use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use leadgen_common::{csv_out, LookupKey, SourceApi, UnifiedLead};
use podcast_catalog::{
    dedupe_and_merge, map_listennotes, map_podscan, ListenNotesClient, PodscanClient,
};

/// Delay between consecutive cross-provider enrichment lookups (spec §4.5, §5).
const CROSS_LOOKUP_DELAY: Duration = Duration::from_millis(500);

/// Implements the Search Engine (spec §4.5): topic-mode keyword fan-out or
/// related-mode BFS, followed by cross-provider enrichment and
/// dedup-and-merge. Catalog-A is ListenNotes, Catalog-B is Podscan
/// (resolved in SPEC_FULL.md).
pub struct SearchEngine {
    pub listennotes: ListenNotesClient,
    pub podscan: PodscanClient,
}

impl SearchEngine {
    pub fn new(listennotes: ListenNotesClient, podscan: PodscanClient) -> Self {
        Self { listennotes, podscan }
    }

    /// Topic mode: concurrent per-keyword fan-out, each keyword paginating
    /// both providers up to a combined cap.
    pub async fn topic_search(&self, keywords: &[String], max_per_keyword: u32) -> Vec<UnifiedLead> {
        let futures = keywords.iter().map(|kw| self.search_keyword(kw, max_per_keyword));
        let results = futures::future::join_all(futures).await;
        results.into_iter().flatten().collect()
    }

    async fn search_keyword(&self, keyword: &str, cap: u32) -> Vec<UnifiedLead> {
        let (from_a, from_b) = tokio::join!(
            self.paginate_listennotes(keyword, cap),
            self.paginate_podscan(keyword, cap),
        );
        let mut combined = from_a;
        combined.extend(from_b);
        combined.truncate(cap as usize);
        combined
    }

    async fn paginate_listennotes(&self, keyword: &str, cap: u32) -> Vec<UnifiedLead> {
        let mut leads = Vec::new();
        let mut offset = 0u32;
        loop {
            if leads.len() >= cap as usize {
                break;
            }
            match self.listennotes.search_podcasts(keyword, offset).await {
                Ok(page) if page.is_empty() => break,
                Ok(page) => {
                    let page_len = page.len();
                    leads.extend(page.iter().map(map_listennotes));
                    offset += page_len as u32;
                }
                Err(err) => {
                    tracing::warn!(keyword, error = %err, "listennotes search page failed");
                    break;
                }
            }
        }
        leads.truncate(cap as usize);
        leads
    }

    async fn paginate_podscan(&self, keyword: &str, cap: u32) -> Vec<UnifiedLead> {
        let mut leads = Vec::new();
        let mut page = 1u32;
        loop {
            if leads.len() >= cap as usize {
                break;
            }
            match self.podscan.search_podcasts(keyword, page).await {
                Ok(results) if results.is_empty() => break,
                Ok(results) => {
                    leads.extend(results.iter().map(map_podscan));
                    page += 1;
                }
                Err(err) => {
                    tracing::warn!(keyword, error = %err, "podscan search page failed");
                    break;
                }
            }
        }
        leads.truncate(cap as usize);
        leads
    }

    /// Related mode: BFS from a seed feed URL, bounded by depth and total
    /// result-set size (spec §4.5).
    pub async fn related_search(
        &self,
        seed_feed_url: &str,
        max_depth: u32,
        max_total_results: u32,
    ) -> Vec<UnifiedLead> {
        let mut results: HashMap<String, UnifiedLead> = HashMap::new();
        let mut processed: HashSet<String> = HashSet::new();
        let mut queue: std::collections::VecDeque<(String, u32)> = std::collections::VecDeque::new();

        queue.push_back((seed_feed_url.to_string(), 1));
        processed.insert(seed_feed_url.to_string());

        while let Some((feed_url, depth)) = queue.pop_front() {
            if depth > max_depth {
                continue;
            }
            if results.len() >= max_total_results as usize {
                break;
            }

            let expansions = self.expand_feed(&feed_url).await;
            for lead in expansions {
                let Some(child_feed_url) = lead.feed_url.clone() else {
                    continue;
                };
                if results.len() >= max_total_results as usize {
                    break;
                }
                results.entry(child_feed_url.clone()).or_insert(lead);
                if !processed.contains(&child_feed_url) && results.len() < max_total_results as usize {
                    processed.insert(child_feed_url.clone());
                    queue.push_back((child_feed_url, depth + 1));
                }
            }
        }

        results.into_values().collect()
    }

    /// Resolve `feed_url` to provider IDs on both catalogs, then fetch
    /// recommendations (A) and related (B), mapping every returned record.
    async fn expand_feed(&self, feed_url: &str) -> Vec<UnifiedLead> {
        let mut out = Vec::new();

        match self.listennotes.lookup_podcast_by_rss(feed_url).await {
            Ok(Some(podcast)) => match self.listennotes.get_recommendations(&podcast.id).await {
                Ok(recs) => out.extend(recs.iter().map(map_listennotes)),
                Err(err) => tracing::warn!(feed_url, error = %err, "listennotes recommendations failed"),
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(feed_url, error = %err, "listennotes rss lookup failed"),
        }

        match self.podscan.search_podcast_by_rss(feed_url).await {
            Ok(Some(podcast)) => match self.podscan.get_related_podcasts(&podcast.podcast_id).await {
                Ok(related) => out.extend(related.iter().map(map_podscan)),
                Err(err) => tracing::warn!(feed_url, error = %err, "podscan related lookup failed"),
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(feed_url, error = %err, "podscan rss lookup failed"),
        }

        out
    }

    /// Cross-provider enrichment (spec §4.5): fill provider-typical-missing
    /// fields from the other catalog, one lookup at a time with a courtesy
    /// delay between calls. Only currently-null fields are set.
    pub async fn cross_provider_enrich(&self, mut leads: Vec<UnifiedLead>) -> Vec<UnifiedLead> {
        let mut first = true;
        for lead in leads.iter_mut() {
            let needs_lookup = match lead.source_api {
                Some(SourceApi::Listennotes) => {
                    lead.audience_size.is_none()
                        || lead.itunes_rating_average.is_none()
                        || lead.itunes_rating_count.is_none()
                        || lead.spotify_rating_average.is_none()
                        || lead.spotify_rating_count.is_none()
                }
                Some(SourceApi::Podscan) => {
                    lead.listen_score.is_none()
                        || lead.listen_score_global_rank.is_none()
                        || lead.latest_pub_date_ms.is_none()
                        || lead.earliest_pub_date_ms.is_none()
                }
                None => false,
            };
            if !needs_lookup {
                continue;
            }

            if !first {
                tokio::time::sleep(CROSS_LOOKUP_DELAY).await;
            }
            first = false;

            let Some(key) = lead.best_lookup_key() else {
                continue;
            };

            let found = match lead.source_api {
                Some(SourceApi::Listennotes) => self.lookup_podscan(key).await,
                Some(SourceApi::Podscan) => self.lookup_listennotes(key).await,
                None => None,
            };

            if let Some(found) = found {
                fill_missing(lead, &found);
            }
        }
        leads
    }

    async fn lookup_podscan(&self, key: LookupKey<'_>) -> Option<UnifiedLead> {
        let result = match key {
            LookupKey::ItunesId(id) => self.podscan.search_podcast_by_itunes_id(id).await,
            LookupKey::FeedUrl(url) => self.podscan.search_podcast_by_rss(url).await,
        };
        match result {
            Ok(Some(podcast)) => Some(map_podscan(&podcast)),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "podscan cross-lookup failed");
                None
            }
        }
    }

    async fn lookup_listennotes(&self, key: LookupKey<'_>) -> Option<UnifiedLead> {
        let result = match key {
            LookupKey::ItunesId(id) => self.listennotes.lookup_podcast_by_itunes_id(id).await,
            LookupKey::FeedUrl(url) => self.listennotes.lookup_podcast_by_rss(url).await,
        };
        match result {
            Ok(Some(podcast)) => Some(map_listennotes(&podcast)),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "listennotes cross-lookup failed");
                None
            }
        }
    }

    /// Run search-by-mode, cross-provider enrichment, dedupe-and-merge, and
    /// write the CSV artifact for already-resolved raw leads (the driver
    /// is responsible for calling `topic_search`/`related_search` first,
    /// since topic mode needs an `LlmClient` for keyword generation that
    /// this engine doesn't own).
    pub async fn finish(
        &self,
        raw_leads: Vec<UnifiedLead>,
        config: &leadgen_common::CampaignConfig,
        data_dir: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<(Vec<UnifiedLead>, PathBuf)> {
        let enriched = self.cross_provider_enrich(raw_leads).await;
        let merged = dedupe_and_merge(enriched, SourceApi::Listennotes);

        let path = csv_out::write_leads_csv(
            data_dir,
            &config.campaign_id,
            config.search_type,
            now,
            &merged,
        )?;

        Ok((merged, path))
    }
}

/// Fill nulls on `lead` from `found`, never overwriting a non-null value.
fn fill_missing(lead: &mut UnifiedLead, found: &UnifiedLead) {
    macro_rules! fill {
        ($field:ident) => {
            if lead.$field.is_none() {
                lead.$field = found.$field.clone();
            }
        };
    }
    fill!(audience_size);
    fill!(itunes_rating_average);
    fill!(itunes_rating_count);
    fill!(spotify_rating_average);
    fill!(spotify_rating_count);
    fill!(listen_score);
    fill!(listen_score_global_rank);
    fill!(latest_pub_date_ms);
    fill!(earliest_pub_date_ms);
    fill!(spotify_id);
    fill!(email);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_missing_only_sets_null_fields() {
        let mut lead = UnifiedLead {
            source_api: Some(SourceApi::Listennotes),
            listen_score: Some(50),
            ..Default::default()
        };
        let found = UnifiedLead {
            listen_score: Some(99),
            audience_size: Some(1000),
            ..Default::default()
        };
        fill_missing(&mut lead, &found);
        assert_eq!(lead.listen_score, Some(50));
        assert_eq!(lead.audience_size, Some(1000));
    }
}
