use crate::{endpoint_url, status_error, GenerationClient};
use poembot_core::{CoreError, LlmError, Message};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

pub const COHERE_API_BASE: &str = "https://api.cohere.ai";
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus";
/// The chat endpoint needs a current message; the conversation rides in `chat_history`.
pub const FOLLOW_INSTRUCTIONS_MESSAGE: &str = "指示に従って要約してください";
const TEMPERATURE: f32 = 1.0;
const PROVIDER: &str = "cohere";

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct CohereMessage<'a> {
    pub role: &'static str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CohereChatRequest<'a> {
    pub model: &'a str,
    pub message: &'static str,
    pub chat_history: Vec<CohereMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CohereChatResponse {
    pub text: Option<String>,
}

/// Rename `content` to `text`, keeping role and order.
pub(crate) fn to_chat_history(messages: &[Message]) -> Vec<CohereMessage<'_>> {
    messages
        .iter()
        .map(|msg| CohereMessage {
            role: msg.role.as_str(),
            text: &msg.content,
        })
        .collect()
}

#[derive(Debug)]
pub struct CohereProvider {
    http_client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl CohereProvider {
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: &str,
    ) -> Result<Self, CoreError> {
        let endpoint = endpoint_url(base_url, "/v1/chat")?;
        Ok(Self {
            http_client: Client::new(),
            api_key,
            model,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    pub(crate) fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl GenerationClient for CohereProvider {
    async fn summarize(&self, messages: &[Message]) -> Result<String, CoreError> {
        let request = CohereChatRequest {
            model: &self.model,
            message: FOLLOW_INSTRUCTIONS_MESSAGE,
            chat_history: to_chat_history(messages),
            temperature: TEMPERATURE,
        };

        info!("Requesting completion from {} ({})", PROVIDER, self.model);
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, &self.model, status.as_u16(), body).into());
        }

        let chat: CohereChatResponse = response.json().await.map_err(|e| {
            debug!("Failed to parse {} response: {}", PROVIDER, e);
            LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
        })?;

        chat.text.ok_or_else(|| {
            LlmError::EmptyCompletion {
                provider: PROVIDER.to_string(),
            }
            .into()
        })
    }
}
