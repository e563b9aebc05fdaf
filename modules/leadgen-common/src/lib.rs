pub mod config;
pub mod csv_out;
pub mod error;
pub mod metrics;
pub mod types;
pub mod url_canon;

pub use config::Config;
pub use error::{PipelineError, ProviderError};
pub use metrics::{MetricsEvent, MetricsSink, TracingMetricsSink};
pub use types::{
    CampaignConfig, EnrichedProfile, ExecutionStatus, LookupKey, QualityTier, ReachStats,
    SearchType, SourceApi, UnifiedLead, VettingResult,
};
pub use url_canon::{canonicalize_twitter_url, canonicalize_url};
