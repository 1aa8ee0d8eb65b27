//! Pooled HTTP access for the site adapters.
//!
//! Each site crawler owns one [`HttpSession`]. The underlying
//! `reqwest::Client` is built on first use and then reused for every search
//! page and article page of that crawler, so connections stay pooled.

use crate::error::{CrawlError, Result};
use once_cell::sync::OnceCell;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Anything that can return the raw body behind a URL.
///
/// [`HttpSession`] is the network implementation; tests substitute canned
/// pages.
pub trait DocumentSource {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: DocumentSource> DocumentSource for &T {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url).await
    }
}

/// Lazily created, reused HTTP client.
#[derive(Debug)]
pub struct HttpSession {
    client: OnceCell<Client>,
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpSession {
    pub fn new(user_agent: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            client: OnceCell::new(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            debug!(user_agent = %self.user_agent, timeout = ?self.timeout, "Creating HTTP client");
            let mut builder = Client::builder().user_agent(self.user_agent.clone());
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().map_err(|e| CrawlError::Fetch {
                url: String::new(),
                source: Box::new(e),
            })
        })
    }
}

impl DocumentSource for HttpSession {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_err = |e: reqwest::Error| CrawlError::Fetch {
            url: url.to_string(),
            source: Box::new(e),
        };

        let response = self.client()?.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(fetch_err)?;
        debug!(bytes = body.len(), "Fetched document");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_body_and_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/X"))
            .and(header("user-agent", "test-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let session = HttpSession::new("test-agent/1.0", Some(Duration::from_secs(5)));
        let url = format!("{}/search/X", mock_server.uri());

        assert_eq!(session.get(&url).await.unwrap(), b"<html>ok</html>");
        // second call goes through the same client
        assert_eq!(session.get(&url).await.unwrap(), b"<html>ok</html>");
        assert!(session.client.get().is_some());
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let session = HttpSession::new("test-agent/1.0", None);
        let url = format!("{}/down", mock_server.uri());

        match session.get(&url).await {
            Err(CrawlError::HttpStatus { status, url: failed }) => {
                assert_eq!(status, 503);
                assert_eq!(failed, url);
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_fetch_error() {
        let session = HttpSession::new("test-agent/1.0", Some(Duration::from_millis(500)));
        let err = session.get("http://127.0.0.1:1/").await.unwrap_err();
        assert!(err.is_fetch());
        assert!(matches!(err, CrawlError::Fetch { .. }));
    }
}
