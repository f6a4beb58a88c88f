use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::config::MemeApiConfig;

/// Outcome of a single meme fetch: the meme URL or the reason it failed
pub type FetchResult = std::result::Result<String, FetchError>;

/// Body returned by the meme API
///
/// Only `url` is required. The rest is logged when present.
#[derive(Debug, Deserialize)]
pub struct MemeResponse {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default, rename = "postLink")]
    pub post_link: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("meme API returned HTTP {0}")]
    Status(StatusCode),

    #[error("meme API request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("meme API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("meme API returned a malformed body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse classification of a [`FetchError`], used as a log field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Status,
    Timeout,
    Transport,
    Decode,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Status(_) => FetchErrorKind::Status,
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Decode(_) => FetchErrorKind::Decode,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else {
            FetchError::Transport(err)
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::Status => "status",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Transport => "transport",
            FetchErrorKind::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// Source of meme URLs
#[async_trait]
pub trait MemeFetcher: Send + Sync {
    /// Fetch one meme URL. Every call is an independent request.
    async fn fetch_meme_url(&self) -> FetchResult;
}

/// HTTP client for the meme API
pub struct MemeApiClient {
    http: reqwest::Client,
    url: String,
}

impl MemeApiClient {
    /// Create a new client; the timeout covers the whole request including the body
    pub fn new(config: &MemeApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build meme API HTTP client")?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl MemeFetcher for MemeApiClient {
    async fn fetch_meme_url(&self) -> FetchResult {
        debug!(url = %self.url, "Requesting meme");

        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let meme: MemeResponse = serde_json::from_slice(&body)?;

        debug!(
            title = meme.title.as_deref().unwrap_or_default(),
            subreddit = meme.subreddit.as_deref().unwrap_or_default(),
            post_link = meme.post_link.as_deref().unwrap_or_default(),
            "Fetched meme"
        );

        Ok(meme.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> MemeApiClient {
        MemeApiClient::new(&MemeApiConfig {
            url: format!("{}/gimme", server.uri()),
            timeout,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_url_from_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gimme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "postLink": "https://redd.it/abc",
                "subreddit": "memes",
                "title": "monday",
                "url": "https://x/y.png",
                "nsfw": false,
                "ups": 12
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(10));

        assert_eq!(client.fetch_meme_url().await.unwrap(), "https://x/y.png");
    }

    #[tokio::test]
    async fn url_is_the_only_required_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"url": "https://x/y.png"}"#))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(10));

        assert_eq!(client.fetch_meme_url().await.unwrap(), "https://x/y.png");
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(10));
        let err = client.fetch_meme_url().await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Status);
        assert!(matches!(err, FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)));
    }

    #[tokio::test]
    async fn missing_url_field_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 400,
                "message": "no memes today"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(10));

        assert_eq!(
            client.fetch_meme_url().await.unwrap_err().kind(),
            FetchErrorKind::Decode
        );
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(10));

        assert_eq!(
            client.fetch_meme_url().await.unwrap_err().kind(),
            FetchErrorKind::Decode
        );
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "url": "https://x/late.png" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        let started = Instant::now();
        let err = client.fetch_meme_url().await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        // Bind and drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = MemeApiClient::new(&MemeApiConfig {
            url: format!("http://127.0.0.1:{port}/gimme"),
            timeout: Duration::from_secs(10),
        })
        .unwrap();

        assert_eq!(
            client.fetch_meme_url().await.unwrap_err().kind(),
            FetchErrorKind::Transport
        );
    }

    #[tokio::test]
    async fn each_call_issues_a_fresh_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "url": "https://x/1.png" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(10));
        client.fetch_meme_url().await.unwrap();
        client.fetch_meme_url().await.unwrap();

        server.verify().await;
    }
}
