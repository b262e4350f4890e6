use poembot_core::RedditPost;

/// Render one post as a text block: metadata lines, body, then every comment.
pub fn render_post(post: &RedditPost) -> String {
    let mut block = format!(
        "Title: {}\nURL: {}\nPosted: {}\nScore: {}\nComments: {}\n\n{}",
        post.title,
        post.url,
        post.formatted_timestamp(),
        post.score,
        post.num_comments,
        post.content.as_deref().unwrap_or_default(),
    );

    for comment in &post.comments {
        block.push_str("\n\n");
        block.push_str(comment);
    }

    block
}

/// Join rendered posts in input order, separated by blank lines.
pub fn compose_content(posts: &[RedditPost]) -> String {
    posts
        .iter()
        .map(render_post)
        .collect::<Vec<_>>()
        .join("\n\n")
}
