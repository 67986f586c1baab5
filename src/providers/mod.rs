//! Vision backends behind one `analyze(image)` capability.

pub mod azure_vision;
pub mod chat_vision;
pub mod google_vision;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::analysis::VisionReport;
use crate::config::Config;
use crate::config::ProviderConfig;
use crate::error::AnalyzeError;
use crate::image_data::ImageUpload;

pub use azure_vision::AzureVision;
pub use chat_vision::ChatVision;
pub use google_vision::GoogleVision;
pub use retry::{Resilient, RetryPolicy};

const LOG_PREVIEW_CHARS: usize = 200;

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Human-readable name, used in logs and user-facing error messages.
    fn name(&self) -> &'static str;

    async fn analyze(&self, upload: &ImageUpload) -> Result<VisionReport, AnalyzeError>;
}

/// Builds the configured backend, wrapped with timeout and retry.
pub fn build_provider(config: &Config) -> Result<Arc<dyn VisionProvider>, reqwest::Error> {
    let client = Client::builder()
        .user_agent(concat!("galek-prompt/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let inner: Arc<dyn VisionProvider> = match &config.provider {
        ProviderConfig::AzureVision { endpoint, key } => {
            Arc::new(AzureVision::new(client, endpoint, key))
        }
        ProviderConfig::GoogleVision { api_key } => Arc::new(GoogleVision::new(client, api_key)),
        ProviderConfig::OpenAi {
            base_url,
            api_key,
            model,
        } => Arc::new(ChatVision::openai(
            client,
            base_url,
            api_key,
            model,
            config.prompt_source,
        )),
        ProviderConfig::AzureOpenAi {
            endpoint,
            api_key,
            deployment,
        } => Arc::new(ChatVision::azure_openai(
            client,
            endpoint,
            api_key,
            deployment,
            config.prompt_source,
        )),
        ProviderConfig::Zai {
            base_url,
            api_key,
            model,
            chat_id,
            user_id,
        } => Arc::new(ChatVision::zai(
            client,
            base_url,
            api_key,
            model,
            chat_id.clone(),
            user_id.clone(),
            config.prompt_source,
        )),
    };

    Ok(Arc::new(Resilient::new(inner, config.retry, config.timeout)))
}

/// Reads a provider response, mapping each failure mode to its own error.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, AnalyzeError> {
    let status = response.status();
    let text = response.text().await?;
    debug!(provider, %status, body = %preview(&text), "provider response");

    if !status.is_success() {
        error!(provider, %status, body = %preview(&text), "provider API error");
        return Err(AnalyzeError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    if text.trim().is_empty() {
        error!(provider, "empty response from provider");
        return Err(AnalyzeError::EmptyResponse);
    }

    serde_json::from_str(&text).map_err(|e| {
        error!(provider, error = %e, body = %preview(&text), "provider returned invalid JSON");
        AnalyzeError::InvalidJson(e.to_string())
    })
}

pub(crate) fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
