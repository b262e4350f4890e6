use crate::{Notifier, SinkKind};
use async_trait::async_trait;
use poembot_core::{CoreError, SlackSettings};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    ts: Option<String>,
}

/// Posts to one channel through `chat.postMessage`.
#[derive(Debug)]
pub struct SlackNotifier {
    http_client: Client,
    bot_token: String,
    channel: String,
}

impl SlackNotifier {
    pub fn new(settings: SlackSettings) -> Self {
        Self {
            http_client: Client::new(),
            bot_token: settings.bot_token,
            channel: settings.channel,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// The message `ts` when Slack accepted the post. Anything else is logged
/// and yields `None`; Slack reports most failures as HTTP 200 with `ok: false`.
pub fn interpret_post_message(status_code: u16, body: &str) -> Option<String> {
    if status_code == 200 {
        let parsed = serde_json::from_str::<PostMessageResponse>(body);
        if let Ok(PostMessageResponse {
            ok: true,
            ts: Some(ts),
        }) = parsed
        {
            return Some(ts);
        }
    }
    warn!("Slack post failed: {}: {}", status_code, body);
    None
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Chat
    }

    async fn send(
        &self,
        text: &str,
        thread_ref: Option<&str>,
    ) -> Result<Option<String>, CoreError> {
        let payload = PostMessageRequest {
            channel: &self.channel,
            text,
            thread_ts: thread_ref,
        };

        debug!("Posting to Slack channel {} (thread: {:?})", self.channel, thread_ref);
        let response = self
            .http_client
            .post(SLACK_POST_MESSAGE_URL)
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body = response.text().await?;
        let ts = interpret_post_message(status_code, &body);
        if let Some(ref ts) = ts {
            info!("Posted to Slack channel {} as {}", self.channel, ts);
        }
        Ok(ts)
    }
}
