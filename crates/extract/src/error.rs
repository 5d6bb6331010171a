use thiserror::Error;

/// Failures talking to the classification service. These abort the run once
/// retries are exhausted.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Classifier request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Classifier returned no completion text")]
    EmptyResponse,

    #[error("Missing API key for {0} backend")]
    MissingApiKey(String),
}

impl OracleError {
    /// Connection problems, rate limiting and server errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Transport(_) | OracleError::EmptyResponse => true,
            OracleError::Status { status, .. } => *status == 429 || *status >= 500,
            OracleError::MissingApiKey(_) => false,
        }
    }
}

/// The classifier answered but the answer is unusable. The record is skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid JSON from classifier: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Classifier response is missing key: {0}")]
    MissingKey(String),
}
