use std::time::Duration;

use thiserror::Error;

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";
const INVALID_RESPONSE_MESSAGE: &str =
    "Could not analyze image due to invalid API response. Please try with a different image.";
const TIMEOUT_MESSAGE: &str = "Request timed out. Please try with a smaller image.";

/// Why an uploaded image was rejected before any provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid image data")]
    InvalidData,
    #[error("Invalid image format")]
    InvalidFormat,
    #[error("Unsupported image format. Use JPG, PNG, or WebP")]
    UnsupportedFormat,
}

/// Failures while talking to a vision provider.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("API failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API returned empty response")]
    EmptyResponse,

    #[error("Could not parse API response. Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("API returned invalid response structure: {0}")]
    InvalidStructure(String),

    #[error("API reported an error: {0}")]
    Rejected(String),

    #[error("API call timed out after {0:?}")]
    Timeout(Duration),

    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AnalyzeError {
    /// Whether another attempt could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyzeError::Timeout(_) | AnalyzeError::Transport(_) => true,
            AnalyzeError::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }

    /// Message safe to show to the end user. Never includes upstream payloads.
    pub fn user_message(&self, provider: &str) -> String {
        match self {
            AnalyzeError::EmptyResponse => {
                format!("{provider} returned empty response. Please try again.")
            }
            AnalyzeError::InvalidJson(_) | AnalyzeError::InvalidStructure(_) => {
                INVALID_RESPONSE_MESSAGE.to_string()
            }
            AnalyzeError::Status { status, body } => match status {
                401 => format!("{provider} API key is invalid. Please check your credentials."),
                403 => {
                    format!("{provider} permission denied. Please check your key permissions.")
                }
                408 => TIMEOUT_MESSAGE.to_string(),
                429 => quota_message(provider),
                _ if mentions_quota(body) => quota_message(provider),
                _ => GENERIC_MESSAGE.to_string(),
            },
            AnalyzeError::Rejected(message) if mentions_quota(message) => quota_message(provider),
            AnalyzeError::Rejected(_) => GENERIC_MESSAGE.to_string(),
            AnalyzeError::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
            AnalyzeError::Transport(err) if err.is_timeout() => TIMEOUT_MESSAGE.to_string(),
            AnalyzeError::Transport(_) => GENERIC_MESSAGE.to_string(),
        }
    }
}

fn mentions_quota(text: &str) -> bool {
    text.to_lowercase().contains("quota")
}

fn quota_message(provider: &str) -> String {
    format!("{provider} quota exceeded. Please check your billing or try again tomorrow.")
}
