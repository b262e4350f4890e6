use crate::{endpoint_url, status_error, GenerationClient};
use poembot_core::{CoreError, LlmError, Message};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

pub const OPENAI_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    pub(crate) fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::EmptyCompletion {
                provider: PROVIDER.to_string(),
            })
    }
}

/// Chat completions against OpenAI or any API speaking the same protocol.
#[derive(Debug)]
pub struct OpenAiProvider {
    http_client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl OpenAiProvider {
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: &str,
    ) -> Result<Self, CoreError> {
        let endpoint = endpoint_url(base_url, "/v1/chat/completions")?;
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

impl GenerationClient for OpenAiProvider {
    async fn summarize(&self, messages: &[Message]) -> Result<String, CoreError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
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

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            debug!("Failed to parse {} response: {}", PROVIDER, e);
            LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
        })?;

        Ok(completion.into_text()?)
    }
}
