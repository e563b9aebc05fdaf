use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::{LlmClient, OpenAi, OpenRouter};
use apify_client::ApifyClient;
use leadgen_common::{CampaignConfig, Config, SearchType, TracingMetricsSink};
use podcast_pipeline::PipelineDriver;

#[derive(Parser)]
#[command(name = "leadgen-cli", about = "Podcast lead-generation pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full campaign through Search, Enrichment, and Vetting.
    Run {
        #[arg(long)]
        campaign_id: String,

        #[arg(long, value_enum)]
        search_type: CliSearchType,

        /// Topic mode: who the guest is trying to reach.
        #[arg(long)]
        target_audience: Option<String>,

        /// Topic mode: repeatable key messages for keyword generation.
        #[arg(long = "key-message")]
        key_messages: Vec<String>,

        #[arg(long, default_value_t = CampaignConfig::DEFAULT_NUM_KEYWORDS)]
        num_keywords: u32,

        #[arg(long, default_value_t = CampaignConfig::DEFAULT_MAX_RESULTS_PER_KEYWORD)]
        max_results_per_keyword: u32,

        /// Related mode: feed URL to expand from.
        #[arg(long)]
        seed_feed_url: Option<String>,

        #[arg(long, default_value_t = CampaignConfig::DEFAULT_MAX_DEPTH)]
        max_depth: u32,

        #[arg(long, default_value_t = CampaignConfig::DEFAULT_MAX_TOTAL_RESULTS)]
        max_total_results: u32,

        /// Vetting: what an ideal booking looks like for this campaign.
        #[arg(long)]
        ideal_podcast_description: Option<String>,

        #[arg(long)]
        guest_bio: Option<String>,

        #[arg(long = "guest-talking-point")]
        guest_talking_points: Vec<String>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliSearchType {
    Topic,
    Related,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadgen=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_redacted();

    match cli.command {
        Command::Run {
            campaign_id,
            search_type,
            target_audience,
            key_messages,
            num_keywords,
            max_results_per_keyword,
            seed_feed_url,
            max_depth,
            max_total_results,
            ideal_podcast_description,
            guest_bio,
            guest_talking_points,
        } => {
            let campaign = CampaignConfig {
                campaign_id,
                search_type: match search_type {
                    CliSearchType::Topic => SearchType::Topic,
                    CliSearchType::Related => SearchType::Related,
                },
                target_audience,
                key_messages,
                num_keywords,
                max_results_per_keyword,
                seed_feed_url,
                max_depth,
                max_total_results,
                ideal_podcast_description,
                guest_bio,
                guest_talking_points,
            };

            info!(campaign_id = %campaign.campaign_id, "starting campaign run");

            let llm = build_llm_client(&config)?;
            let apify = ApifyClient::new(config.apify_api_key.clone());
            let metrics = TracingMetricsSink;

            let driver = PipelineDriver {
                config: &config,
                llm: llm.as_ref(),
                apify: &apify,
                metrics: &metrics,
            };

            let outcome = driver.run(&campaign).await;

            info!(status = %outcome.execution_status, "campaign run finished");
            println!("execution_status: {}", outcome.execution_status);
            if let Some(path) = &outcome.leads_csv_path {
                println!("leads_csv: {}", path.display());
            }
            if let Some(path) = &outcome.enriched_csv_path {
                println!("enriched_csv: {}", path.display());
            }
            if let Some(path) = &outcome.vetting_csv_path {
                println!("vetting_csv: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Prefer OpenRouter when configured — it's the only provider here with
/// grounded web search, which discovery and keyword generation both need.
/// Falls back to plain OpenAI (grounded_search degrades to a no-op) when
/// only an OpenAI key is set.
fn build_llm_client(config: &Config) -> Result<Box<dyn LlmClient + Send + Sync>> {
    if !config.openrouter_api_key.is_empty() {
        return Ok(Box::new(OpenRouter::new(
            config.openrouter_api_key.clone(),
            config.llm_model.clone(),
        )));
    }
    if !config.openai_api_key.is_empty() {
        return Ok(Box::new(OpenAi::new(
            config.openai_api_key.clone(),
            config.llm_model.clone(),
        )));
    }
    bail!("no LLM provider configured: set OPENROUTER_API_KEY or OPENAI_API_KEY");
}
