use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, Scope, TokenResponse, TokenUrl,
};
use poembot_core::{CoreError, RedditApiError, RedditCredentials};
use tracing::{debug, error, info};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Application-only OAuth2 for Reddit (client-credentials grant).
///
/// A fresh token is requested for every run; nothing is cached.
#[derive(Debug)]
pub struct RedditAuthenticator {
    oauth_client: BasicClient,
    user_agent: String,
}

impl RedditAuthenticator {
    pub fn new(credentials: &RedditCredentials) -> Result<Self, CoreError> {
        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            AuthUrl::new(REDDIT_AUTH_URL.to_string())?,
            Some(TokenUrl::new(REDDIT_TOKEN_URL.to_string())?),
        );

        Ok(Self {
            oauth_client,
            user_agent: credentials.user_agent.clone(),
        })
    }

    pub fn required_scopes() -> Vec<&'static str> {
        vec!["read"]
    }

    pub async fn fetch_access_token(&self) -> Result<String, CoreError> {
        let user_agent = self.user_agent.clone();
        let mut request = self.oauth_client.exchange_client_credentials();
        for scope in Self::required_scopes() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        info!("Requesting Reddit application token");
        let token = request
            .request_async(|http_request| send_token_request(http_request, user_agent))
            .await
            .map_err(|e| {
                error!("Reddit token exchange failed: {}", e);
                RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                }
            })?;

        debug!("Received Reddit token, expires in {:?}", token.expires_in());
        Ok(token.access_token().secret().clone())
    }
}

/// Token exchange transport. Reddit rejects requests without a descriptive
/// User-Agent, which the stock oauth2 client does not send.
async fn send_token_request(
    request: HttpRequest,
    user_agent: String,
) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let mut builder = client.post(request.url.as_str()).body(request.body);
    for (name, value) in request.headers.iter() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.send().await?;
    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
