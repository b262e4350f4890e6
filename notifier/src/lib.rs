pub mod bluesky;
pub mod slack;

pub use bluesky::BlueskyNotifier;
pub use slack::SlackNotifier;

use async_trait::async_trait;
use poembot_core::{AppConfig, CoreError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Threaded chat, such as a Slack channel.
    Chat,
    /// Public social feed with a length limit.
    Social,
}

/// A destination for the finished text.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> SinkKind;

    /// Deliver `text`, optionally as a reply to `thread_ref`. Returns a
    /// reference to the delivered message when the sink has one.
    async fn send(&self, text: &str, thread_ref: Option<&str>)
        -> Result<Option<String>, CoreError>;
}

/// Every sink whose credentials are present in `config`.
pub fn notifiers_from_config(config: &AppConfig) -> Result<Vec<Box<dyn Notifier>>, CoreError> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if let Some(settings) = config.slack()? {
        info!("Slack notifications enabled for channel {}", settings.channel);
        notifiers.push(Box::new(SlackNotifier::new(settings)));
    }
    if let Some(credentials) = config.bluesky()? {
        info!("Bluesky notifications enabled for {}", credentials.username);
        notifiers.push(Box::new(BlueskyNotifier::new(credentials)));
    }

    Ok(notifiers)
}
