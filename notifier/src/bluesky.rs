use crate::{Notifier, SinkKind};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use poembot_core::{BlueskyCredentials, CoreError, NotifyError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const BLUESKY_SERVICE: &str = "https://bsky.social";
const SINK: &str = "bluesky";
const POST_COLLECTION: &str = "app.bsky.feed.post";
const TAG_FEATURE: &str = "app.bsky.richtext.facet#tag";

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'static str,
    record: PostRecord<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: &'a str,
    created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<Facet>,
}

#[derive(Debug, Deserialize)]
struct CreateRecordResponse {
    uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<TagFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagFeature {
    #[serde(rename = "$type")]
    pub feature_type: &'static str,
    pub tag: String,
}

/// Tag facets for every `#word` that starts the text or follows whitespace.
/// Offsets are UTF-8 byte positions, as the AT Protocol requires.
pub fn hashtag_facets(text: &str) -> Vec<Facet> {
    let mut facets = Vec::new();
    let mut at_boundary = true;
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch == '#' && at_boundary {
            let tag_start = start + ch.len_utf8();
            let mut end = tag_start;
            while let Some(&(idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                end = idx + next.len_utf8();
                chars.next();
            }
            if end > tag_start {
                facets.push(Facet {
                    index: ByteSlice {
                        byte_start: start,
                        byte_end: end,
                    },
                    features: vec![TagFeature {
                        feature_type: TAG_FEATURE,
                        tag: text[tag_start..end].to_string(),
                    }],
                });
            }
            at_boundary = false;
            continue;
        }
        at_boundary = ch.is_whitespace();
    }

    facets
}

/// Posts to Bluesky, signing in again for every post.
#[derive(Debug)]
pub struct BlueskyNotifier {
    http_client: Client,
    service: String,
    username: String,
    password: String,
}

impl BlueskyNotifier {
    pub fn new(credentials: BlueskyCredentials) -> Self {
        Self {
            http_client: Client::new(),
            service: BLUESKY_SERVICE.to_string(),
            username: credentials.username,
            password: credentials.password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }

    async fn create_session(&self) -> Result<Session, CoreError> {
        let response = self
            .http_client
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &self.username,
                password: &self.password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::AuthenticationFailed {
                sink: SINK.to_string(),
                reason: format!("{}: {}", status, body),
            }
            .into());
        }

        let session: Session = parse_json(response).await?;
        debug!("Signed in to Bluesky as {}", session.did);
        Ok(session)
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, CoreError> {
    response.json().await.map_err(|e| {
        NotifyError::InvalidResponse {
            sink: SINK.to_string(),
            details: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl Notifier for BlueskyNotifier {
    fn name(&self) -> &str {
        SINK
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Social
    }

    async fn send(
        &self,
        text: &str,
        _thread_ref: Option<&str>,
    ) -> Result<Option<String>, CoreError> {
        let session = self.create_session().await?;

        let request = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord {
                record_type: POST_COLLECTION,
                text,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                facets: hashtag_facets(text),
            },
        };

        let response = self
            .http_client
            .post(self.xrpc_url("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::PostRejected {
                sink: SINK.to_string(),
                status_code: status.as_u16(),
                body,
            }
            .into());
        }

        let created: CreateRecordResponse = parse_json(response).await?;
        info!("Posted to Bluesky as {}", created.uri);
        Ok(Some(created.uri))
    }
}
