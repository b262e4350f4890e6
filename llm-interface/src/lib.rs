pub mod cohere;
pub mod openai;
pub mod prompts;

pub use cohere::CohereProvider;
pub use openai::OpenAiProvider;

use poembot_core::{
    AppConfig, ConfigError, CoreError, LlmError, Message, COHERE_API_KEY, COHERE_BASE_URL,
    OPENAI_API_KEY, OPENAI_BASE_URL,
};
use std::str::FromStr;
use tracing::info;
use url::Url;

/// A backend that turns a conversation into generated text.
pub trait GenerationClient {
    async fn summarize(&self, messages: &[Message]) -> Result<String, CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEngine {
    OpenAi,
    Cohere,
}

impl FromStr for AiEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiEngine::OpenAi),
            "cohere" => Ok(AiEngine::Cohere),
            _ => Err(ConfigError::UnsupportedEngine {
                engine: s.to_string(),
            }),
        }
    }
}

/// The configured generation backend.
#[derive(Debug)]
pub enum AiClient {
    OpenAi(OpenAiProvider),
    Cohere(CohereProvider),
}

impl AiClient {
    /// Select and build the backend named by `AI_ENGINE`.
    ///
    /// Validation happens before any HTTP client exists, so an unsupported
    /// engine or a missing key never reaches the network.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let engine: AiEngine = config.ai_engine().parse()?;

        let client = match engine {
            AiEngine::OpenAi => {
                let api_key = config.require(OPENAI_API_KEY)?.to_string();
                let model = config
                    .ai_model()
                    .unwrap_or(openai::DEFAULT_OPENAI_MODEL)
                    .to_string();
                let base_url = config
                    .get_non_empty(OPENAI_BASE_URL)
                    .unwrap_or(openai::OPENAI_API_BASE);
                AiClient::OpenAi(OpenAiProvider::with_base_url(api_key, model, base_url)?)
            }
            AiEngine::Cohere => {
                let api_key = config.require(COHERE_API_KEY)?.to_string();
                let model = config
                    .ai_model()
                    .unwrap_or(cohere::DEFAULT_COHERE_MODEL)
                    .to_string();
                let base_url = config
                    .get_non_empty(COHERE_BASE_URL)
                    .unwrap_or(cohere::COHERE_API_BASE);
                AiClient::Cohere(CohereProvider::with_base_url(api_key, model, base_url)?)
            }
        };

        info!("Using {:?} backend with model {}", engine, client.model());
        Ok(client)
    }

    pub fn model(&self) -> &str {
        match self {
            AiClient::OpenAi(provider) => provider.model(),
            AiClient::Cohere(provider) => provider.model(),
        }
    }
}

impl GenerationClient for AiClient {
    async fn summarize(&self, messages: &[Message]) -> Result<String, CoreError> {
        match self {
            AiClient::OpenAi(provider) => provider.summarize(messages).await,
            AiClient::Cohere(provider) => provider.summarize(messages).await,
        }
    }
}

/// `path` appended to `base_url`, keeping any path prefix the base carries.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, CoreError> {
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
    Ok(base.join(path.trim_start_matches('/'))?)
}

pub(crate) fn status_error(
    provider: &str,
    model: &str,
    status_code: u16,
    body: String,
) -> LlmError {
    match status_code {
        401 | 403 => LlmError::AuthenticationFailed {
            provider: provider.to_string(),
        },
        404 => LlmError::ModelNotAvailable {
            model: model.to_string(),
        },
        429 => LlmError::RateLimitExceeded {
            provider: provider.to_string(),
        },
        _ => LlmError::RequestFailed {
            provider: provider.to_string(),
            status_code,
            body,
        },
    }
}
