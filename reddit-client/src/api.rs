use poembot_core::{CoreError, RedditApiError, RedditPost};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const TOP_WINDOW: &str = "day";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub subreddit: String,
    pub url: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub is_self: bool,
}

/// Subreddit names are letters, digits and underscores. Anything else would
/// change the request path or query.
pub fn validate_subreddit(name: &str) -> Result<(), CoreError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidInput {
            message: format!("invalid subreddit name: {:?}", name),
        })
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    user_agent: String,
    api_base: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        let http_client = Client::builder().user_agent(&user_agent).build()?;

        Ok(Self {
            http_client,
            user_agent,
            api_base: REDDIT_API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for {} {}: {}", method, endpoint, e);
            CoreError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        Err(CoreError::RedditApi(status_to_error(
            status,
            endpoint,
            retry_after,
        )))
    }

    /// Today's top posts of a subreddit, at most `limit` of them.
    pub async fn get_top_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        validate_subreddit(subreddit)?;
        let endpoint = format!("/r/{}/top", subreddit);
        let limit_str = limit.to_string();
        let params = [
            ("t", TOP_WINDOW),
            ("limit", limit_str.as_str()),
            ("raw_json", "1"),
        ];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params[..]))
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Every comment body under a post, flattened depth-first.
    pub async fn get_comment_bodies(
        &self,
        access_token: &str,
        post_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let params = [("raw_json", "1")];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params[..]))
            .await?;

        // [post listing, comment listing]
        let listings: Vec<Value> = response.json().await.map_err(|e| {
            error!("Failed to parse comments: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse comments for post {}", post_id),
            })
        })?;

        let bodies = match listings.get(1) {
            Some(comment_listing) => flatten_comments(comment_listing),
            None => {
                warn!("Comment response for {} had no comment listing", post_id);
                Vec::new()
            }
        };

        debug!("Flattened {} comments for post {}", bodies.len(), post_id);
        Ok(bodies)
    }
}

pub(crate) fn status_to_error(
    status: StatusCode,
    endpoint: &str,
    retry_after: Option<u64>,
) -> RedditApiError {
    match status.as_u16() {
        429 => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => match endpoint.strip_prefix("/r/") {
            Some(rest) => RedditApiError::SubredditNotFound {
                subreddit: rest.split('/').next().unwrap_or(rest).to_string(),
            },
            None => RedditApiError::InvalidResponse {
                details: format!("Resource not found: {}", endpoint),
            },
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    }
}

/// Collect comment bodies from a comment listing, depth-first in listing
/// order. "Load more" stubs (kind `more`) are skipped.
pub fn flatten_comments(listing: &Value) -> Vec<String> {
    let mut bodies = Vec::new();
    collect_comment_bodies(listing, &mut bodies);
    bodies
}

fn collect_comment_bodies(listing: &Value, bodies: &mut Vec<String>) {
    let Some(children) = listing["data"]["children"].as_array() else {
        return;
    };

    for child in children {
        if child["kind"] != "t1" {
            continue;
        }
        let data = &child["data"];
        if let Some(body) = data["body"].as_str() {
            bodies.push(body.to_string());
        }
        // `replies` is an empty string when there are none
        if data["replies"].is_object() {
            collect_comment_bodies(&data["replies"], bodies);
        }
    }
}

impl From<RedditPostData> for RedditPost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            content: if post_data.is_self && !post_data.selftext.is_empty() {
                Some(post_data.selftext)
            } else {
                None
            },
            subreddit: post_data.subreddit,
            url: post_data.url,
            created_utc: post_data.created_utc as i64,
            score: post_data.score,
            num_comments: post_data.num_comments,
            comments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let client = RedditApiClient::new("test-user-agent/1.0".to_string()).unwrap();
        assert_eq!(client.user_agent(), "test-user-agent/1.0");
    }

    #[test]
    fn test_subreddit_names() {
        for name in ["japan", "rust", "Ask_Japan", "r4r"] {
            assert!(validate_subreddit(name).is_ok(), "{name}");
        }
        for name in ["", "japan?t=all", "a/b", "../comments", "ポエム", "r/japan", "two words"] {
            assert!(
                matches!(validate_subreddit(name), Err(CoreError::InvalidInput { .. })),
                "{name}"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_subreddit_is_rejected_before_request() {
        // Nothing listens on port 1; reaching the network would give a Network error.
        let client = RedditApiClient::new("test-user-agent/1.0".to_string())
            .unwrap()
            .with_api_base("http://127.0.0.1:1");
        let result = client.get_top_posts("token", "japan?t=all", 3).await;
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let client = RedditApiClient::new("test-user-agent/1.0".to_string())
            .unwrap()
            .with_api_base("http://127.0.0.1:1");
        let result = client
            .make_request(Method::GET, "/r/japan/top", "token", None)
            .await;
        assert!(matches!(result, Err(CoreError::Network(_))));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_to_error(StatusCode::TOO_MANY_REQUESTS, "/r/rust/top", Some(12)),
            RedditApiError::RateLimitExceeded { retry_after: 12 }
        ));
        assert!(matches!(
            status_to_error(StatusCode::TOO_MANY_REQUESTS, "/r/rust/top", None),
            RedditApiError::RateLimitExceeded { retry_after: 60 }
        ));
        assert!(matches!(
            status_to_error(StatusCode::UNAUTHORIZED, "/r/rust/top", None),
            RedditApiError::InvalidToken
        ));
        assert!(matches!(
            status_to_error(StatusCode::BAD_GATEWAY, "/r/rust/top", None),
            RedditApiError::ServerError { status_code: 502 }
        ));
    }

    #[test]
    fn test_not_found_names_the_subreddit() {
        match status_to_error(StatusCode::NOT_FOUND, "/r/japan/top", None) {
            RedditApiError::SubredditNotFound { subreddit } => assert_eq!(subreddit, "japan"),
            other => panic!("Expected SubredditNotFound, got {:?}", other),
        }
        assert!(matches!(
            status_to_error(StatusCode::NOT_FOUND, "/comments/abc", None),
            RedditApiError::InvalidResponse { .. }
        ));
    }

    #[test]
    fn test_reddit_post_conversion() {
        let post_data: RedditPostData = serde_json::from_value(serde_json::json!({
            "id": "test123",
            "title": "Test Post",
            "selftext": "This is test content",
            "subreddit": "test",
            "url": "https://reddit.com/r/test/comments/test123",
            "permalink": "/r/test/comments/test123",
            "created_utc": 1640995200.0,
            "score": 42,
            "num_comments": 5,
            "is_self": true,
            "author": "ignored_field"
        }))
        .unwrap();

        let reddit_post: RedditPost = post_data.into();
        assert_eq!(reddit_post.id, "test123");
        assert_eq!(reddit_post.title, "Test Post");
        assert_eq!(
            reddit_post.content,
            Some("This is test content".to_string())
        );
        assert_eq!(reddit_post.created_utc, 1640995200);
        assert_eq!(reddit_post.score, 42);
        assert_eq!(reddit_post.num_comments, 5);
        assert!(reddit_post.comments.is_empty());
    }

    #[test]
    fn test_link_post_has_no_content() {
        let post_data: RedditPostData = serde_json::from_value(serde_json::json!({
            "id": "link1",
            "title": "Link",
            "selftext": "",
            "subreddit": "test",
            "url": "https://example.com/article",
            "created_utc": 1640995200.0,
            "is_self": false
        }))
        .unwrap();
        let reddit_post: RedditPost = post_data.into();
        assert_eq!(reddit_post.content, None);
        assert_eq!(reddit_post.url, "https://example.com/article");
    }
}
