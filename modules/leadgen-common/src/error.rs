use thiserror::Error;

/// Error kinds the core pipeline distinguishes (spec §7). Anything below
/// `StageFailed` is recovered locally by the component that raised it —
/// these variants exist so the pipeline driver can classify a run's
/// terminal outcome, not so callers retry automatically.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing API key, invalid `search_type`, or similar misconfiguration.
    /// Fails the run immediately.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A collaborator client failed to initialize (e.g. base URL invalid).
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Unhandled exception in orchestration code itself. No further stages run.
    #[error("stage-level failure in {stage}: {message}")]
    StageFailed { stage: String, message: String },
}

/// Transient vs. permanent classification for a single provider call
/// (spec §4.1, §7). Transient errors have already been retried per policy
/// by the time this is constructed; permanent errors are reported as-is.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed (401): {0}")]
    Unauthorized(String),

    #[error("rate limited (429), retries exhausted")]
    RateLimited,

    #[error("client error ({status}): {body}")]
    ClientError { status: u16, body: String },

    #[error("server error ({status}) after retries: {body}")]
    ServerError { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether this error should fail the run immediately (config-shaped)
    /// rather than simply yield "no data" for the single call that hit it.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ProviderError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}
