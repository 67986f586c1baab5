//! Runtime configuration, read from the environment (after `.env` is loaded).

use std::time::Duration;

use thiserror::Error;

use crate::providers::retry::RetryPolicy;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
// A 10 MB image grows by a third once base64-encoded.
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ZAI_MODEL: &str = "glm-4.5v";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set for the {provider} provider")]
    Missing {
        provider: &'static str,
        var: &'static str,
    },

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },

    #[error("unknown VISION_PROVIDER {0:?} (expected azure-vision, google, openai, azure-openai or zai)")]
    UnknownProvider(String),

    #[error("no vision provider configured: set VISION_PROVIDER or one of AZURE_VISION_KEY, GOOGLE_VISION_API_KEY, OPENAI_API_KEY, AZURE_OPENAI_KEY, ZAI_API_KEY")]
    NoProvider,
}

/// Which backend answers `/api/analyze`, with its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    AzureVision {
        endpoint: String,
        key: String,
    },
    GoogleVision {
        api_key: String,
    },
    OpenAi {
        base_url: String,
        api_key: String,
        model: String,
    },
    AzureOpenAi {
        endpoint: String,
        api_key: String,
        deployment: String,
    },
    Zai {
        base_url: String,
        api_key: String,
        model: String,
        chat_id: Option<String>,
        user_id: Option<String>,
    },
}

/// Whether the final prompt comes from the template or from the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptSource {
    #[default]
    Template,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: ProviderConfig,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub fallback_on_error: bool,
    pub prompt_source: PromptSource,
    pub max_body_bytes: usize,
    pub on_vercel: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let provider = provider_from(&get)?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            provider,
            timeout: Duration::from_secs(parse_or(
                "PROVIDER_TIMEOUT_SECS",
                get("PROVIDER_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            retry: RetryPolicy {
                attempts: parse_or(
                    "RETRY_ATTEMPTS",
                    get("RETRY_ATTEMPTS"),
                    DEFAULT_RETRY_ATTEMPTS,
                )?,
                base_delay: Duration::from_millis(parse_or(
                    "RETRY_BASE_DELAY_MS",
                    get("RETRY_BASE_DELAY_MS"),
                    DEFAULT_RETRY_BASE_DELAY_MS,
                )?),
            },
            fallback_on_error: parse_flag("FALLBACK_ON_ERROR", get("FALLBACK_ON_ERROR"))?,
            prompt_source: match get("PROMPT_SOURCE").as_deref() {
                None | Some("template") => PromptSource::Template,
                Some("model") => PromptSource::Model,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        var: "PROMPT_SOURCE",
                        value: other.to_string(),
                    })
                }
            },
            max_body_bytes: parse_or(
                "MAX_BODY_BYTES",
                get("MAX_BODY_BYTES"),
                DEFAULT_MAX_BODY_BYTES,
            )?,
            on_vercel: get("VERCEL").is_some(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn environment_label(&self) -> &'static str {
        if self.on_vercel {
            "Vercel (Production)"
        } else {
            "Local"
        }
    }
}

fn provider_from(get: &dyn Fn(&str) -> Option<String>) -> Result<ProviderConfig, ConfigError> {
    let name = match get("VISION_PROVIDER") {
        Some(name) => name.to_lowercase(),
        None => infer_provider(get)?.to_string(),
    };

    let require = |provider: &'static str, var: &'static str| {
        get(var).ok_or(ConfigError::Missing { provider, var })
    };

    match name.as_str() {
        "azure-vision" | "azure" => Ok(ProviderConfig::AzureVision {
            endpoint: require("azure-vision", "AZURE_ENDPOINT")?,
            key: require("azure-vision", "AZURE_VISION_KEY")?,
        }),
        "google" | "google-vision" => Ok(ProviderConfig::GoogleVision {
            api_key: require("google", "GOOGLE_VISION_API_KEY")?,
        }),
        "openai" => Ok(ProviderConfig::OpenAi {
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            api_key: require("openai", "OPENAI_API_KEY")?,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }),
        "azure-openai" => Ok(ProviderConfig::AzureOpenAi {
            endpoint: require("azure-openai", "AZURE_OPENAI_ENDPOINT")?,
            api_key: require("azure-openai", "AZURE_OPENAI_KEY")?,
            deployment: require("azure-openai", "AZURE_OPENAI_DEPLOYMENT")?,
        }),
        "zai" => Ok(ProviderConfig::Zai {
            base_url: require("zai", "ZAI_BASE_URL")?,
            api_key: require("zai", "ZAI_API_KEY")?,
            model: get("ZAI_MODEL").unwrap_or_else(|| DEFAULT_ZAI_MODEL.to_string()),
            chat_id: get("ZAI_CHAT_ID"),
            user_id: get("ZAI_USER_ID"),
        }),
        _ => Err(ConfigError::UnknownProvider(name)),
    }
}

fn infer_provider(get: &dyn Fn(&str) -> Option<String>) -> Result<&'static str, ConfigError> {
    [
        ("AZURE_OPENAI_KEY", "azure-openai"),
        ("OPENAI_API_KEY", "openai"),
        ("AZURE_VISION_KEY", "azure-vision"),
        ("GOOGLE_VISION_API_KEY", "google"),
        ("ZAI_API_KEY", "zai"),
    ]
    .into_iter()
    .find(|(var, _)| get(*var).is_some())
    .map(|(_, name)| name)
    .ok_or(ConfigError::NoProvider)
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_flag(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}
