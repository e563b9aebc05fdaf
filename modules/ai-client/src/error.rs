use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("missing API key: {0}")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("no content in provider response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Parse(err.to_string())
    }
}
