pub mod api;
pub mod auth;
pub mod content;

mod tests;

pub use api::{flatten_comments, validate_subreddit, RedditApiClient};
pub use auth::RedditAuthenticator;
pub use content::compose_content;

use async_trait::async_trait;
use poembot_core::{AppConfig, CoreError, RedditPost};
use tracing::info;

/// Where forum text comes from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Text of the top `limit` posts of `community`, comments included.
    async fn fetch(&self, community: &str, limit: u32) -> Result<String, CoreError>;
}

#[derive(Debug)]
pub struct RedditClient {
    authenticator: RedditAuthenticator,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let credentials = config.reddit()?;
        Ok(Self {
            authenticator: RedditAuthenticator::new(&credentials)?,
            api: RedditApiClient::new(credentials.user_agent.clone())?,
        })
    }

    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError> {
        validate_subreddit(subreddit)?;
        let access_token = self.authenticator.fetch_access_token().await?;
        let listing = self
            .api
            .get_top_posts(&access_token, subreddit, limit)
            .await?;

        let mut posts = Vec::with_capacity(listing.data.children.len());
        for child in listing.data.children {
            let mut post: RedditPost = child.data.into();
            post.comments = self.api.get_comment_bodies(&access_token, &post.id).await?;
            posts.push(post);
        }
        Ok(posts)
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    async fn fetch(&self, community: &str, limit: u32) -> Result<String, CoreError> {
        let posts = self.fetch_posts(community, limit).await?;
        info!("Composing text from {} posts in r/{}", posts.len(), community);
        Ok(compose_content(&posts))
    }
}
