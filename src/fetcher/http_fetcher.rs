use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::Client;
use tracing::debug;

use crate::app::{Result, XhsError};
use crate::fetcher::Fetcher;

const DEFAULT_USER_AGENT: &str = concat!("xhsfeed/", env!("CARGO_PKG_VERSION"));

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);

        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| {
                XhsError::Config(format!("cookie is not a valid header value: {}", e))
            })?;
            request = request.header(COOKIE, value);
        }

        let response = request.send().await?;
        response.error_for_status_ref()?;
        debug!(url, status = %response.status(), "fetched page");

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_cookie_is_rejected_before_sending() {
        let fetcher = HttpFetcher::new(None, Duration::from_secs(1)).unwrap();

        let err = fetcher
            .fetch("http://127.0.0.1:9/", Some("web_session=abc\nInjected: 1"))
            .await
            .unwrap_err();

        assert!(matches!(err, XhsError::Config(_)));
    }
}
