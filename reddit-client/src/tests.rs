#[cfg(test)]
mod tests {
    use crate::{compose_content, content, flatten_comments, ContentSource, RedditClient};
    use poembot_core::{
        AppConfig, ConfigError, CoreError, RedditPost, REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET,
        REDDIT_USER_AGENT,
    };
    use serde_json::json;

    fn create_test_post(id: &str, title: &str, comments: &[&str]) -> RedditPost {
        RedditPost {
            id: id.to_string(),
            title: title.to_string(),
            content: Some(format!("body of {}", id)),
            subreddit: "test".to_string(),
            url: format!("https://reddit.com/r/test/comments/{}", id),
            created_utc: 1640995200,
            score: 42,
            num_comments: comments.len() as u64,
            comments: comments.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn comment(body: &str, replies: serde_json::Value) -> serde_json::Value {
        json!({"kind": "t1", "data": {"body": body, "replies": replies}})
    }

    #[test]
    fn test_client_from_config() {
        let config = AppConfig::from_pairs([
            (REDDIT_CLIENT_ID, "test_client_id"),
            (REDDIT_CLIENT_SECRET, "test_client_secret"),
            (REDDIT_USER_AGENT, "poembot/0.1 by test_user"),
        ]);
        let client = RedditClient::from_config(&config).unwrap();
        assert_eq!(client.api.user_agent(), "poembot/0.1 by test_user");
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_community() {
        let config = AppConfig::from_pairs([
            (REDDIT_CLIENT_ID, "test_client_id"),
            (REDDIT_CLIENT_SECRET, "test_client_secret"),
        ]);
        let client = RedditClient::from_config(&config).unwrap();
        for community in ["japan?t=all", "a/b", ""] {
            match client.fetch(community, 3).await {
                Err(CoreError::InvalidInput { message }) => {
                    assert!(message.contains("subreddit"), "{message}")
                }
                other => panic!("Expected InvalidInput for {community:?}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_client_requires_credentials() {
        let config = AppConfig::from_pairs([(REDDIT_CLIENT_ID, "test_client_id")]);
        match RedditClient::from_config(&config) {
            Err(CoreError::Config(ConfigError::MissingEnvironmentVariable { var_name })) => {
                assert_eq!(var_name, REDDIT_CLIENT_SECRET)
            }
            other => panic!("Expected missing secret, got {:?}", other),
        }
    }

    #[test]
    fn test_compose_keeps_each_title_once_in_order() {
        let titles = ["Alpha sunrise", "Bravo harbor", "Charlie lantern", "Delta orchard"];
        let posts: Vec<RedditPost> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| create_test_post(&format!("p{}", i), title, &["a comment"]))
            .collect();

        let text = compose_content(&posts);

        let mut last_position = 0;
        for title in titles {
            assert_eq!(text.matches(title).count(), 1, "title {title} repeated");
            let position = text.find(title).unwrap();
            assert!(position >= last_position, "title {title} out of order");
            last_position = position;
        }
    }

    #[test]
    fn test_compose_blocks_separated_by_blank_line() {
        let posts = vec![
            create_test_post("a", "First", &[]),
            create_test_post("b", "Second", &[]),
        ];
        let text = compose_content(&posts);
        assert!(text.contains("body of a\n\nTitle: Second"));
        assert!(compose_content(&[]).is_empty());
    }

    #[test]
    fn test_render_post_contains_metadata_and_comments() {
        let post = create_test_post("abc", "Quiet sea", &["first reply", "second reply"]);
        let block = content::render_post(&post);
        assert!(block.starts_with("Title: Quiet sea\n"));
        assert!(block.contains("URL: https://reddit.com/r/test/comments/abc"));
        assert!(block.contains("Posted: 2022-01-01 00:00:00"));
        assert!(block.contains("Score: 42"));
        assert!(block.contains("Comments: 2"));
        assert!(block.contains("body of abc"));
        assert!(block.ends_with("first reply\n\nsecond reply"));
    }

    #[test]
    fn test_flatten_comments_depth_first() {
        let listing = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    comment("top one", json!({
                        "kind": "Listing",
                        "data": {"children": [
                            comment("reply to one", json!("")),
                            {"kind": "more", "data": {"count": 3, "children": ["x", "y"]}}
                        ]}
                    })),
                    comment("top two", json!("")),
                ]
            }
        });

        assert_eq!(
            flatten_comments(&listing),
            vec!["top one", "reply to one", "top two"]
        );
    }

    #[test]
    fn test_flatten_comments_tolerates_odd_shapes() {
        assert!(flatten_comments(&json!({})).is_empty());
        assert!(flatten_comments(&json!({"data": {"children": "nope"}})).is_empty());
        let deleted = json!({"data": {"children": [{"kind": "t1", "data": {"replies": ""}}]}});
        assert!(flatten_comments(&deleted).is_empty());
    }
}
