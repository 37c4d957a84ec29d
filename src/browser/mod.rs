//! Headless browser automation.
//!
//! The rest of the crate talks to the browser only through the
//! [`BrowserProvider`] and [`PageHandle`] traits, so the login manager and
//! the collect pipeline can be exercised against in-memory fakes.
//!
//! ```rust,ignore
//! use xhsfeed::browser::{BrowserConfig, BrowserProvider, ChromeBrowser, PageRequest};
//!
//! let browser = ChromeBrowser::new(BrowserConfig::default());
//! let page = browser
//!     .open_page(PageRequest::new("https://www.xiaohongshu.com/explore").viewport(1280, 800))
//!     .await?;
//! page.wait_for_selector(".qrcode-img", Duration::from_secs(15)).await?;
//! let png = page.screenshot_element(".qrcode-img").await?;
//! page.close().await?;
//! ```

mod chrome;
mod config;

pub use chrome::ChromeBrowser;
pub use config::BrowserConfig;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::app::{Result, XhsError};

/// A cookie read from the browser's cookie jar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
}

impl BrowserCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A JSON response body recorded while the page was loading
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub url: String,
    pub body: Value,
}

/// What to open and how to prepare the page before navigating
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub url: String,
    /// `(width, height)` in CSS pixels
    pub viewport: Option<(u32, u32)>,
    /// Cookie header value to install before navigating
    pub cookie: Option<String>,
    /// Domain the cookie is installed for
    pub cookie_domain: Option<String>,
    /// URL fragments of responses whose JSON body should be recorded
    pub capture: Vec<String>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn cookie(mut self, cookie: impl Into<String>, domain: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn capture(mut self, fragment: impl Into<String>) -> Self {
        self.capture.push(fragment.into());
        self
    }
}

/// An open browser page
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Wait until an element matching `selector` exists
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Read every cookie visible to the page
    async fn cookies(&self) -> Result<Vec<BrowserCookie>>;

    /// PNG screenshot of the first element matching `selector`
    async fn screenshot_element(&self, selector: &str) -> Result<Vec<u8>>;

    /// PNG screenshot of the whole page
    async fn screenshot_page(&self) -> Result<Vec<u8>>;

    /// Current serialized DOM
    async fn content(&self) -> Result<String>;

    /// Responses recorded so far for the request's capture fragments
    async fn captured_responses(&self) -> Vec<CapturedResponse>;

    /// Release the page. Further calls on the handle fail.
    async fn close(&self) -> Result<()>;
}

/// Opens pages in a browser
#[async_trait]
pub trait BrowserProvider: Send + Sync {
    async fn open_page(&self, request: PageRequest) -> Result<Arc<dyn PageHandle>>;
}

/// Close `page`, giving up after `timeout`
pub async fn close_within(page: &dyn PageHandle, timeout: Duration) -> Result<()> {
    tokio::time::timeout(timeout, page.close())
        .await
        .map_err(|_| XhsError::Timeout("closing page".to_string()))?
}

/// Owns an open page and closes it when dropped unless
/// [`close`](PageGuard::close) already ran.
pub struct PageGuard {
    page: Arc<dyn PageHandle>,
    timeout: Duration,
    armed: bool,
}

impl PageGuard {
    pub fn new(page: Arc<dyn PageHandle>, timeout: Duration) -> Self {
        Self {
            page,
            timeout,
            armed: true,
        }
    }

    pub fn page(&self) -> &dyn PageHandle {
        self.page.as_ref()
    }

    pub async fn close(mut self) -> Result<()> {
        self.armed = false;
        close_within(self.page.as_ref(), self.timeout).await
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime left to close a dropped page");
            return;
        };
        let page = self.page.clone();
        let timeout = self.timeout;
        runtime.spawn(async move {
            if let Err(e) = close_within(page.as_ref(), timeout).await {
                debug!("Failed to close dropped page: {}", e);
            }
        });
    }
}

/// Parse a `Cookie` header value into name/value pairs
pub fn parse_cookie_header(header: &str) -> Vec<BrowserCookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(BrowserCookie::new(name, value.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("web_session=abc; a1=x=y;  ;webId=1");
        assert_eq!(
            cookies,
            vec![
                BrowserCookie::new("web_session", "abc"),
                BrowserCookie::new("a1", "x=y"),
                BrowserCookie::new("webId", "1"),
            ]
        );
    }

    #[test]
    fn test_page_request_builder() {
        let request = PageRequest::new("https://example.com")
            .viewport(800, 600)
            .cookie("a=1", ".example.com")
            .capture("/api/");
        assert_eq!(request.viewport, Some((800, 600)));
        assert_eq!(request.cookie.as_deref(), Some("a=1"));
        assert_eq!(request.cookie_domain.as_deref(), Some(".example.com"));
        assert_eq!(request.capture, vec!["/api/".to_string()]);
    }

    #[tokio::test]
    async fn test_page_guard_closes_once() {
        let page = Arc::new(FakePage::new());
        let guard = PageGuard::new(page.clone(), Duration::from_secs(1));

        guard.close().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(page.close_count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_page_guard_closes_page() {
        let page = Arc::new(FakePage::new());
        drop(PageGuard::new(page.clone(), Duration::from_secs(1)));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(page.close_count(), 1);
    }
}
