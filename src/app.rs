use crate::cli::RunMode;
use llm_interface::{prompts, AiClient, GenerationClient};
use notifier::{notifiers_from_config, Notifier, SinkKind};
use poembot_core::{AppConfig, CoreError, POEM_HASHTAG, POEM_LENGTH_GATE, POEM_THREAD_HEADER};
use reddit_client::{ContentSource, RedditClient};
use tracing::{info, warn};

/// Longest text a social sink receives when the length gate is on.
pub const MAX_SOCIAL_CHARS: usize = 140;
pub const DEFAULT_THREAD_HEADER: &str = "今日のポエム";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunInput {
    Theme(String),
    Forum { community: String, limit: u32 },
}

/// Behaviour that differs between run modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Chat sinks post this first and put the poem in its thread.
    pub thread_header: Option<String>,
    /// Appended to the poem after a space.
    pub hashtag: Option<String>,
    /// Skip social sinks when the text is longer than [`MAX_SOCIAL_CHARS`].
    pub length_gate: bool,
}

impl PipelineOptions {
    pub fn for_mode(mode: RunMode) -> Self {
        match mode {
            RunMode::Direct => Self {
                thread_header: Some(DEFAULT_THREAD_HEADER.to_string()),
                hashtag: None,
                length_gate: false,
            },
            RunMode::Forum => Self {
                thread_header: None,
                hashtag: None,
                length_gate: true,
            },
        }
    }

    /// Mode defaults with environment overrides applied. An empty
    /// `POEM_THREAD_HEADER` turns the header off.
    pub fn from_config(mode: RunMode, config: &AppConfig) -> Result<Self, CoreError> {
        let mut options = Self::for_mode(mode);

        if let Some(header) = config.get(POEM_THREAD_HEADER) {
            let header = header.trim();
            options.thread_header = (!header.is_empty()).then(|| header.to_string());
        }
        if let Some(tag) = config.get_non_empty(POEM_HASHTAG) {
            let tag = tag.trim();
            options.hashtag = Some(if tag.starts_with('#') {
                tag.to_string()
            } else {
                format!("#{}", tag)
            });
        }
        if let Some(gate) = config.get_bool(POEM_LENGTH_GATE)? {
            options.length_gate = gate;
        }

        Ok(options)
    }

    pub fn decorate(&self, poem: &str) -> String {
        match &self.hashtag {
            Some(tag) => format!("{} {}", poem, tag),
            None => poem.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sink: String,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub theme: String,
    pub text: String,
    pub deliveries: Vec<Delivery>,
    pub skipped: Vec<String>,
}

/// Source → prompts → generation → sinks, run once.
pub struct Application<G> {
    generator: G,
    source: Option<Box<dyn ContentSource>>,
    sinks: Vec<Box<dyn Notifier>>,
    options: PipelineOptions,
}

impl Application<AiClient> {
    pub fn from_config(config: &AppConfig, mode: RunMode) -> Result<Self, CoreError> {
        let generator = AiClient::from_config(config)?;
        let options = PipelineOptions::from_config(mode, config)?;
        let mut app = Self::new(generator, options).with_sinks(notifiers_from_config(config)?);

        if mode == RunMode::Forum {
            app = app.with_source(Box::new(RedditClient::from_config(config)?));
        }
        if app.sinks.is_empty() {
            warn!("No notification sinks configured; the poem will only be printed");
        }
        Ok(app)
    }
}

impl<G: GenerationClient> Application<G> {
    pub fn new(generator: G, options: PipelineOptions) -> Self {
        Self {
            generator,
            source: None,
            sinks: Vec::new(),
            options,
        }
    }

    pub fn with_source(mut self, source: Box<dyn ContentSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_sinks(mut self, sinks: Vec<Box<dyn Notifier>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn run(&self, input: &RunInput) -> Result<RunReport, CoreError> {
        let theme = match input {
            RunInput::Theme(theme) => {
                if theme.trim().is_empty() {
                    return Err(CoreError::InvalidInput {
                        message: "theme must not be empty".to_string(),
                    });
                }
                theme.clone()
            }
            RunInput::Forum { community, limit } => self.extract_theme(community, *limit).await?,
        };

        let poem = self
            .generator
            .summarize(&prompts::poem_messages(&theme))
            .await?;
        let poem = poem.trim();
        println!("{}", poem);

        let text = self.options.decorate(poem);
        let (deliveries, skipped) = self.notify(&text).await?;

        Ok(RunReport {
            theme,
            text,
            deliveries,
            skipped,
        })
    }

    async fn extract_theme(&self, community: &str, limit: u32) -> Result<String, CoreError> {
        let source = self.source.as_ref().ok_or_else(|| CoreError::InvalidInput {
            message: "forum mode needs a configured content source".to_string(),
        })?;

        let content = source.fetch(community, limit).await?;
        info!("Fetched {} characters from r/{}", content.chars().count(), community);

        let theme = self
            .generator
            .summarize(&prompts::theme_messages(&content))
            .await?;
        let theme = theme.trim().to_string();
        info!("Extracted theme: {}", theme);
        Ok(theme)
    }

    async fn notify(&self, text: &str) -> Result<(Vec<Delivery>, Vec<String>), CoreError> {
        let length = text.chars().count();
        let mut deliveries = Vec::with_capacity(self.sinks.len());
        let mut skipped = Vec::new();

        for sink in &self.sinks {
            if sink.kind() == SinkKind::Social
                && self.options.length_gate
                && length > MAX_SOCIAL_CHARS
            {
                info!(
                    "Skipping {}: text is {} characters, limit is {}",
                    sink.name(),
                    length,
                    MAX_SOCIAL_CHARS
                );
                skipped.push(sink.name().to_string());
                continue;
            }

            let thread_ref = match (sink.kind(), &self.options.thread_header) {
                (SinkKind::Chat, Some(header)) => sink.send(header, None).await?,
                _ => None,
            };
            let reference = sink.send(text, thread_ref.as_deref()).await?;
            deliveries.push(Delivery {
                sink: sink.name().to_string(),
                reference,
            });
        }

        Ok((deliveries, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use poembot_core::{ConfigError, Message, Role, OPENAI_API_KEY};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct FakeGenerator {
        replies: Mutex<VecDeque<String>>,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl FakeGenerator {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GenerationClient for FakeGenerator {
        async fn summarize(&self, messages: &[Message]) -> Result<String, CoreError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected generation call"))
        }
    }

    type SentLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

    struct RecordingSink {
        name: &'static str,
        kind: SinkKind,
        sent: SentLog,
    }

    impl RecordingSink {
        fn boxed(name: &'static str, kind: SinkKind) -> (Box<dyn Notifier>, SentLog) {
            let sent = SentLog::default();
            let sink = Self {
                name,
                kind,
                sent: Arc::clone(&sent),
            };
            (Box::new(sink), sent)
        }
    }

    #[async_trait]
    impl Notifier for RecordingSink {
        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> SinkKind {
            self.kind
        }

        async fn send(
            &self,
            text: &str,
            thread_ref: Option<&str>,
        ) -> Result<Option<String>, CoreError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((text.to_string(), thread_ref.map(str::to_string)));
            Ok(Some(format!("{}-{}", self.name, sent.len())))
        }
    }

    struct FakeSource {
        text: String,
        requests: Arc<Mutex<Vec<(String, u32)>>>,
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch(&self, community: &str, limit: u32) -> Result<String, CoreError> {
            self.requests
                .lock()
                .unwrap()
                .push((community.to_string(), limit));
            Ok(self.text.clone())
        }
    }

    fn plain_options() -> PipelineOptions {
        PipelineOptions {
            thread_header: None,
            hashtag: None,
            length_gate: false,
        }
    }

    #[tokio::test]
    async fn test_direct_mode_sends_poem_to_each_sink_once() {
        let poem = "x".repeat(50);
        let (chat, chat_sent) = RecordingSink::boxed("chat", SinkKind::Chat);
        let (social, social_sent) = RecordingSink::boxed("social", SinkKind::Social);
        let app = Application::new(FakeGenerator::new(&[poem.as_str()]), plain_options())
            .with_sinks(vec![chat, social]);

        let report = app.run(&RunInput::Theme("海".to_string())).await.unwrap();

        assert_eq!(*chat_sent.lock().unwrap(), vec![(poem.clone(), None)]);
        assert_eq!(*social_sent.lock().unwrap(), vec![(poem.clone(), None)]);
        assert_eq!(report.text, poem);
        assert_eq!(report.theme, "海");
        assert_eq!(report.deliveries.len(), 2);
        assert!(report.skipped.is_empty());

        let calls = app.generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], prompts::poem_messages("海"));
    }

    #[tokio::test]
    async fn test_thread_header_posts_poem_as_reply() {
        let (chat, chat_sent) = RecordingSink::boxed("chat", SinkKind::Chat);
        let (social, social_sent) = RecordingSink::boxed("social", SinkKind::Social);
        let app = Application::new(
            FakeGenerator::new(&["poem"]),
            PipelineOptions::for_mode(RunMode::Direct),
        )
        .with_sinks(vec![chat, social]);

        let report = app.run(&RunInput::Theme("海".to_string())).await.unwrap();

        assert_eq!(
            *chat_sent.lock().unwrap(),
            vec![
                (DEFAULT_THREAD_HEADER.to_string(), None),
                ("poem".to_string(), Some("chat-1".to_string())),
            ]
        );
        // Social sinks never get the header.
        assert_eq!(*social_sent.lock().unwrap(), vec![("poem".to_string(), None)]);
        assert_eq!(report.deliveries[0].reference.as_deref(), Some("chat-2"));
    }

    #[tokio::test]
    async fn test_length_gate_skips_social_sink() {
        let long_poem = "波".repeat(MAX_SOCIAL_CHARS + 1);
        let (chat, chat_sent) = RecordingSink::boxed("chat", SinkKind::Chat);
        let (social, social_sent) = RecordingSink::boxed("social", SinkKind::Social);
        let options = PipelineOptions {
            length_gate: true,
            ..plain_options()
        };
        let app = Application::new(FakeGenerator::new(&[long_poem.as_str()]), options)
            .with_sinks(vec![chat, social]);

        let report = app.run(&RunInput::Theme("海".to_string())).await.unwrap();

        assert!(social_sent.lock().unwrap().is_empty());
        assert_eq!(chat_sent.lock().unwrap().len(), 1);
        assert_eq!(report.skipped, vec!["social".to_string()]);
    }

    #[tokio::test]
    async fn test_length_gate_counts_characters_not_bytes() {
        let poem = "波".repeat(MAX_SOCIAL_CHARS);
        let (social, social_sent) = RecordingSink::boxed("social", SinkKind::Social);
        let options = PipelineOptions {
            length_gate: true,
            ..plain_options()
        };
        let app = Application::new(FakeGenerator::new(&[poem.as_str()]), options)
            .with_sinks(vec![social]);

        app.run(&RunInput::Theme("海".to_string())).await.unwrap();

        assert_eq!(social_sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_length_gate_off_posts_long_text() {
        let long_poem = "x".repeat(MAX_SOCIAL_CHARS + 10);
        let (social, social_sent) = RecordingSink::boxed("social", SinkKind::Social);
        let app = Application::new(FakeGenerator::new(&[long_poem.as_str()]), plain_options())
            .with_sinks(vec![social]);

        app.run(&RunInput::Theme("海".to_string())).await.unwrap();

        assert_eq!(social_sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_forum_mode_extracts_theme_then_writes_poem() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let source = FakeSource {
            text: "Title: Autumn leaves\n\nlots of comments".to_string(),
            requests: Arc::clone(&requests),
        };
        let (social, social_sent) = RecordingSink::boxed("social", SinkKind::Social);
        let options = PipelineOptions {
            hashtag: Some("#ポエム".to_string()),
            ..PipelineOptions::for_mode(RunMode::Forum)
        };
        let app = Application::new(FakeGenerator::new(&["  紅葉\n", "落ち葉の詩"]), options)
            .with_source(Box::new(source))
            .with_sinks(vec![social]);

        let report = app
            .run(&RunInput::Forum {
                community: "japan".to_string(),
                limit: 3,
            })
            .await
            .unwrap();

        assert_eq!(*requests.lock().unwrap(), vec![("japan".to_string(), 3)]);

        let calls = app.generator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            prompts::theme_messages("Title: Autumn leaves\n\nlots of comments")
        );
        assert_eq!(calls[1], prompts::poem_messages("紅葉"));
        assert_eq!(calls[1].last().unwrap().role, Role::User);

        assert_eq!(report.theme, "紅葉");
        assert_eq!(
            *social_sent.lock().unwrap(),
            vec![("落ち葉の詩 #ポエム".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_forum_mode_without_source_fails() {
        let app = Application::new(FakeGenerator::new(&[]), plain_options());
        let result = app
            .run(&RunInput::Forum {
                community: "japan".to_string(),
                limit: 3,
            })
            .await;
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
        assert!(app.generator.calls().is_empty());
    }

    #[test]
    fn test_empty_theme_is_rejected() {
        let app = Application::new(FakeGenerator::new(&[]), plain_options());
        let result = tokio_test::block_on(app.run(&RunInput::Theme("   ".to_string())));
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
        assert!(app.generator.calls().is_empty());
    }

    #[test]
    fn test_mode_defaults() {
        let direct = PipelineOptions::for_mode(RunMode::Direct);
        assert_eq!(direct.thread_header.as_deref(), Some(DEFAULT_THREAD_HEADER));
        assert!(!direct.length_gate);

        let forum = PipelineOptions::for_mode(RunMode::Forum);
        assert_eq!(forum.thread_header, None);
        assert!(forum.length_gate);
    }

    #[test]
    fn test_options_env_overrides() {
        let config = AppConfig::from_pairs([
            (POEM_THREAD_HEADER, ""),
            (POEM_HASHTAG, "ポエム"),
            (POEM_LENGTH_GATE, "true"),
        ]);
        let options = PipelineOptions::from_config(RunMode::Direct, &config).unwrap();
        assert_eq!(options.thread_header, None);
        assert_eq!(options.hashtag.as_deref(), Some("#ポエム"));
        assert!(options.length_gate);
        assert_eq!(options.decorate("詩"), "詩 #ポエム");
    }

    #[test]
    fn test_options_reject_bad_bool() {
        let config = AppConfig::from_pairs([(POEM_LENGTH_GATE, "sometimes")]);
        assert!(matches!(
            PipelineOptions::from_config(RunMode::Forum, &config),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_from_config_requires_reddit_in_forum_mode() {
        let config = AppConfig::from_pairs([(OPENAI_API_KEY, "sk-test")]);
        assert!(Application::from_config(&config, RunMode::Direct).is_ok());
        assert!(matches!(
            Application::from_config(&config, RunMode::Forum),
            Err(CoreError::Config(ConfigError::MissingEnvironmentVariable { .. }))
        ));
    }
}
