pub mod discovery;
pub mod hints;
pub mod merge;
pub mod scraping;
pub mod url_post;

pub use hints::EnrichmentHints;
pub use scraping::{PlatformStatsMaps, PlatformUrlSets};

use std::path::PathBuf;

use ai_client::LlmClient;
use apify_client::ApifyClient;
use leadgen_common::{csv_out, EnrichedProfile, UnifiedLead};
use podcast_catalog::{RssFeedInfo, RssParser};

/// Enrichment Orchestrator (spec §4.6): three strictly-ordered phases —
/// concurrent per-lead discovery, a join barrier, then a cross-lead batch
/// scrape, then concurrent per-lead merge. Output order matches input
/// lead order.
pub struct EnrichmentOrchestrator<'a> {
    pub llm: &'a (dyn LlmClient + Send + Sync),
    pub apify: &'a ApifyClient,
    pub rss_parser: Option<&'a RssParser>,
}

impl<'a> EnrichmentOrchestrator<'a> {
    pub fn new(
        llm: &'a (dyn LlmClient + Send + Sync),
        apify: &'a ApifyClient,
        rss_parser: Option<&'a RssParser>,
    ) -> Self {
        Self { llm, apify, rss_parser }
    }

    pub async fn run(
        &self,
        leads: Vec<UnifiedLead>,
        data_dir: &str,
        campaign_id: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<(Vec<EnrichedProfile>, PathBuf)> {
        // Phase 1: concurrent per-lead discovery.
        let discoveries = futures::future::join_all(
            leads.iter().map(|lead| discovery::discover(self.llm, lead)),
        )
        .await;

        let paired: Vec<(UnifiedLead, EnrichmentHints)> =
            leads.into_iter().zip(discoveries).collect();

        // Barrier: Phase 2 only starts once every Phase 1 task has returned.
        let url_sets = scraping::collect_platform_urls(&paired);
        let stats = scraping::run_scrapers(self.apify, &url_sets).await;

        // Phase 3: concurrent per-lead merge, preserving input order.
        let merges = futures::future::join_all(paired.iter().map(|(lead, hints)| {
            let stats = &stats;
            async move {
                let rss = self.fetch_rss(lead).await;
                merge::merge_profile(lead, hints, stats, rss.as_ref(), now)
            }
        }))
        .await;

        let path = csv_out::write_enriched_csv(data_dir, campaign_id, now, &merges)?;
        Ok((merges, path))
    }

    async fn fetch_rss(&self, lead: &UnifiedLead) -> Option<RssFeedInfo> {
        let parser = self.rss_parser?;
        let feed_url = lead.feed_url.as_deref()?;
        match parser.fetch(feed_url).await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!(feed_url, error = %err, "rss enrichment failed");
                None
            }
        }
    }
}
