//! Process configuration, read once from the environment at startup.
//!
//! Values stay as raw strings here. Each consumer parses the keys it owns
//! (for example the generation backend parses `AI_ENGINE`), so a bad value
//! surfaces as a [`ConfigError`] from the constructor that needs it.

use crate::error::ConfigError;
use std::collections::HashMap;

pub const AI_ENGINE: &str = "AI_ENGINE";
pub const AI_MODEL: &str = "AI_MODEL";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const COHERE_API_KEY: &str = "COHERE_API_KEY";
pub const COHERE_BASE_URL: &str = "COHERE_BASE_URL";
pub const REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const SLACK_CHANNEL: &str = "SLACK_CHANNEL";
pub const BLUESKY_USERNAME: &str = "BLUESKY_USERNAME";
pub const BLUESKY_PASSWORD: &str = "BLUESKY_PASSWORD";
pub const POEM_THREAD_HEADER: &str = "POEM_THREAD_HEADER";
pub const POEM_HASHTAG: &str = "POEM_HASHTAG";
pub const POEM_LENGTH_GATE: &str = "POEM_LENGTH_GATE";

const KNOWN_KEYS: &[&str] = &[
    AI_ENGINE,
    AI_MODEL,
    OPENAI_API_KEY,
    OPENAI_BASE_URL,
    COHERE_API_KEY,
    COHERE_BASE_URL,
    REDDIT_CLIENT_ID,
    REDDIT_CLIENT_SECRET,
    REDDIT_USER_AGENT,
    SLACK_BOT_TOKEN,
    SLACK_CHANNEL,
    BLUESKY_USERNAME,
    BLUESKY_PASSWORD,
    POEM_THREAD_HEADER,
    POEM_HASHTAG,
    POEM_LENGTH_GATE,
];

pub const DEFAULT_AI_ENGINE: &str = "openai";
pub const DEFAULT_REDDIT_USER_AGENT: &str = "poembot/0.1";

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub bot_token: String,
    pub channel: String,
}

#[derive(Debug, Clone)]
pub struct BlueskyCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    /// Snapshot the known keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = KNOWN_KEYS
            .iter()
            .filter_map(|key| lookup(key).map(|value| (key.to_string(), value)))
            .collect();
        Self { values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but blank values count as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get_non_empty(key)
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: key.to_string(),
            })
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(raw) = self.get_non_empty(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                field: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub fn ai_engine(&self) -> &str {
        self.get_non_empty(AI_ENGINE).unwrap_or(DEFAULT_AI_ENGINE)
    }

    pub fn ai_model(&self) -> Option<&str> {
        self.get_non_empty(AI_MODEL)
    }

    pub fn reddit(&self) -> Result<RedditCredentials, ConfigError> {
        Ok(RedditCredentials {
            client_id: self.require(REDDIT_CLIENT_ID)?.to_string(),
            client_secret: self.require(REDDIT_CLIENT_SECRET)?.to_string(),
            user_agent: self
                .get_non_empty(REDDIT_USER_AGENT)
                .unwrap_or(DEFAULT_REDDIT_USER_AGENT)
                .to_string(),
        })
    }

    /// Slack is enabled when a bot token is present; the channel is then required.
    pub fn slack(&self) -> Result<Option<SlackSettings>, ConfigError> {
        let Some(bot_token) = self.get_non_empty(SLACK_BOT_TOKEN) else {
            return Ok(None);
        };
        Ok(Some(SlackSettings {
            bot_token: bot_token.to_string(),
            channel: self.require(SLACK_CHANNEL)?.to_string(),
        }))
    }

    /// Bluesky is enabled when a username is present; the password is then required.
    pub fn bluesky(&self) -> Result<Option<BlueskyCredentials>, ConfigError> {
        let Some(username) = self.get_non_empty(BLUESKY_USERNAME) else {
            return Ok(None);
        };
        Ok(Some(BlueskyCredentials {
            username: username.to_string(),
            password: self.require(BLUESKY_PASSWORD)?.to_string(),
        }))
    }
}
