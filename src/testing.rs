//! In-memory stand-ins for the browser and the HTTP fetcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{Result, XhsError};
use crate::browser::{BrowserCookie, BrowserProvider, CapturedResponse, PageHandle, PageRequest};
use crate::fetcher::Fetcher;

pub struct FakePage {
    jar: Mutex<Vec<BrowserCookie>>,
    cookie_error: Mutex<Option<String>>,
    cookie_delay: Mutex<Duration>,
    selectors_render: Mutex<bool>,
    selector_delay: Mutex<Duration>,
    content_delay: Mutex<Duration>,
    screenshot_selectors: Mutex<Option<Vec<String>>>,
    page_screenshot_fails: Mutex<bool>,
    content: Mutex<String>,
    captured: Mutex<Vec<CapturedResponse>>,
    cookie_reads: AtomicUsize,
    closed: AtomicUsize,
}

impl FakePage {
    pub const PAGE_PNG: &'static [u8] = b"\x89PNG full page";

    pub fn new() -> Self {
        Self {
            jar: Mutex::new(Vec::new()),
            cookie_error: Mutex::new(None),
            cookie_delay: Mutex::new(Duration::ZERO),
            selectors_render: Mutex::new(true),
            selector_delay: Mutex::new(Duration::ZERO),
            content_delay: Mutex::new(Duration::ZERO),
            screenshot_selectors: Mutex::new(None),
            page_screenshot_fails: Mutex::new(false),
            content: Mutex::new(String::new()),
            captured: Mutex::new(Vec::new()),
            cookie_reads: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        }
    }

    pub fn element_png(selector: &str) -> Vec<u8> {
        format!("\u{89}PNG {}", selector).into_bytes()
    }

    pub fn set_jar(&self, jar: Vec<BrowserCookie>) {
        *self.jar.lock().unwrap() = jar;
    }

    pub fn fail_cookie_reads(&self, message: &str) {
        *self.cookie_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_cookie_delay(&self, delay: Duration) {
        *self.cookie_delay.lock().unwrap() = delay;
    }

    pub fn set_selectors_render(&self, render: bool) {
        *self.selectors_render.lock().unwrap() = render;
    }

    /// Selector waits take this long before resolving
    pub fn set_selector_delay(&self, delay: Duration) {
        *self.selector_delay.lock().unwrap() = delay;
    }

    pub fn set_content_delay(&self, delay: Duration) {
        *self.content_delay.lock().unwrap() = delay;
    }

    /// Only these selectors can be screenshotted; default is every selector
    pub fn set_screenshot_selectors(&self, selectors: &[&str]) {
        *self.screenshot_selectors.lock().unwrap() =
            Some(selectors.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_page_screenshot_fails(&self, fails: bool) {
        *self.page_screenshot_fails.lock().unwrap() = fails;
    }

    pub fn set_content(&self, html: &str) {
        *self.content.lock().unwrap() = html.to_string();
    }

    pub fn push_captured(&self, url: &str, body: serde_json::Value) {
        self.captured.lock().unwrap().push(CapturedResponse {
            url: url.to_string(),
            body,
        });
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn cookie_reads(&self) -> usize {
        self.cookie_reads.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.close_count() > 0 {
            return Err(XhsError::Browser("page closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<()> {
        let delay = *self.selector_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.selectors_render.lock().unwrap() {
            Ok(())
        } else {
            Err(XhsError::Timeout(format!("waiting for selector {}", selector)))
        }
    }

    async fn cookies(&self) -> Result<Vec<BrowserCookie>> {
        self.cookie_reads.fetch_add(1, Ordering::SeqCst);
        let jar = self.jar.lock().unwrap().clone();
        let error = self.cookie_error.lock().unwrap().clone();
        let delay = *self.cookie_delay.lock().unwrap();

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match error {
            Some(message) => Err(XhsError::Browser(message)),
            None => Ok(jar),
        }
    }

    async fn screenshot_element(&self, selector: &str) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let allowed = self.screenshot_selectors.lock().unwrap().clone();
        match allowed {
            Some(list) if !list.iter().any(|s| s == selector) => {
                Err(XhsError::Browser(format!("no element for {}", selector)))
            }
            _ => Ok(Self::element_png(selector)),
        }
    }

    async fn screenshot_page(&self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        if *self.page_screenshot_fails.lock().unwrap() {
            return Err(XhsError::Browser("capture failed".into()));
        }
        Ok(Self::PAGE_PNG.to_vec())
    }

    async fn content(&self) -> Result<String> {
        let delay = *self.content_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.ensure_open()?;
        Ok(self.content.lock().unwrap().clone())
    }

    async fn captured_responses(&self) -> Vec<CapturedResponse> {
        self.captured.lock().unwrap().clone()
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out the same page for every request, or fails every request
pub struct FakeBrowser {
    page: Option<Arc<FakePage>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl FakeBrowser {
    pub fn new(page: Arc<FakePage>) -> Self {
        Self {
            page: Some(page),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            page: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserProvider for FakeBrowser {
    async fn open_page(&self, request: PageRequest) -> Result<Arc<dyn PageHandle>> {
        self.requests.lock().unwrap().push(request);
        match &self.page {
            Some(page) => Ok(page.clone()),
            None => Err(XhsError::Browser("browser unavailable".into())),
        }
    }
}

/// Serves canned HTML by URL
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    cookies: Mutex<Vec<Option<String>>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cookies(&self) -> Vec<Option<String>> {
        self.cookies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cookies.lock().unwrap().push(cookie.map(String::from));
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| XhsError::Other(format!("no fixture for {}", url)))
    }
}
