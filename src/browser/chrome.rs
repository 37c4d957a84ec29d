use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeLaunchConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::{Result, XhsError};
use crate::browser::{
    close_within, parse_cookie_header, BrowserConfig, BrowserCookie, BrowserProvider,
    CapturedResponse, PageHandle, PageRequest,
};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chrome-backed [`BrowserProvider`] using chromiumoxide.
///
/// The browser process is launched on the first [`open_page`](BrowserProvider::open_page)
/// call and shared by every page after that.
pub struct ChromeBrowser {
    browser: OnceCell<Arc<Browser>>,
    config: BrowserConfig,
}

impl ChromeBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            browser: OnceCell::new(),
            config,
        }
    }

    async fn browser(&self) -> Result<Arc<Browser>> {
        self.browser
            .get_or_try_init(|| Self::launch(&self.config))
            .await
            .cloned()
    }

    async fn launch(config: &BrowserConfig) -> Result<Arc<Browser>> {
        let mut builder = ChromeLaunchConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let launch_config = builder
            .build()
            .map_err(|e| XhsError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(launch_config).await.map_err(|e| {
            XhsError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        info!("Browser launched (headless: {})", config.headless);
        Ok(Arc::new(browser))
    }

    async fn prepare(&self, page: &Page, request: &PageRequest) -> Result<()> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua).await?;
        }

        if let Some((width, height)) = request.viewport {
            page.execute(SetDeviceMetricsOverrideParams::new(
                i64::from(width),
                i64::from(height),
                1.0,
                false,
            ))
            .await?;
        }

        if let (Some(cookie), Some(domain)) = (&request.cookie, &request.cookie_domain) {
            let params = parse_cookie_header(cookie)
                .into_iter()
                .map(|c| {
                    CookieParam::builder()
                        .name(c.name)
                        .value(c.value)
                        .domain(domain.clone())
                        .path("/")
                        .build()
                        .map_err(XhsError::Browser)
                })
                .collect::<Result<Vec<_>>>()?;
            page.set_cookies(params).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BrowserProvider for ChromeBrowser {
    async fn open_page(&self, request: PageRequest) -> Result<Arc<dyn PageHandle>> {
        let timeout = self.config.timeout();

        let browser = tokio::time::timeout(timeout, self.browser())
            .await
            .map_err(|_| XhsError::Timeout("launching the browser".to_string()))??;
        let page = tokio::time::timeout(timeout, browser.new_page("about:blank"))
            .await
            .map_err(|_| XhsError::Timeout("creating a page".to_string()))?
            .map_err(|e| XhsError::Browser(format!("Failed to create page: {}", e)))?;

        let handle = ChromePage {
            page: page.clone(),
            captured: Arc::new(Mutex::new(Vec::new())),
            capture_task: Mutex::new(None),
        };

        let opened = async {
            tokio::time::timeout(timeout, async {
                self.prepare(&page, &request).await?;

                if !request.capture.is_empty() {
                    let task =
                        spawn_capture(&page, request.capture.clone(), handle.captured.clone())
                            .await?;
                    *handle.capture_task.lock().await = Some(task);
                }
                Ok::<_, XhsError>(())
            })
            .await
            .map_err(|_| XhsError::Timeout(format!("preparing page for {}", request.url)))??;

            tokio::time::timeout(timeout, async {
                page.goto(request.url.as_str()).await?;
                page.wait_for_navigation().await?;
                Ok::<_, XhsError>(())
            })
            .await
            .map_err(|_| XhsError::Timeout(format!("navigation to {}", request.url)))?
        }
        .await;

        if let Err(e) = opened {
            if let Err(close_err) = close_within(&handle, timeout).await {
                debug!("Failed to close page after setup error: {}", close_err);
            }
            return Err(e);
        }

        debug!("Opened page {}", request.url);
        Ok(Arc::new(handle))
    }
}

/// Record JSON bodies of responses whose URL contains one of `fragments`.
///
/// Bodies are only available once loading finished, so matching request ids
/// are remembered on `responseReceived` and read on `loadingFinished`.
async fn spawn_capture(
    page: &Page,
    fragments: Vec<String>,
    captured: Arc<Mutex<Vec<CapturedResponse>>>,
) -> Result<JoinHandle<()>> {
    let mut responses = page.event_listener::<EventResponseReceived>().await?;
    let mut finished = page.event_listener::<EventLoadingFinished>().await?;
    let page = page.clone();

    Ok(tokio::spawn(async move {
        let mut pending: HashMap<RequestId, String> = HashMap::new();

        loop {
            tokio::select! {
                Some(event) = responses.next() => {
                    let url = &event.response.url;
                    if fragments.iter().any(|f| url.contains(f.as_str())) {
                        pending.insert(event.request_id.clone(), url.clone());
                    }
                }
                Some(event) = finished.next() => {
                    let Some(url) = pending.remove(&event.request_id) else {
                        continue;
                    };
                    let body = match page
                        .execute(GetResponseBodyParams::new(event.request_id.clone()))
                        .await
                    {
                        Ok(body) => body,
                        Err(e) => {
                            debug!("Could not read response body of {}: {}", url, e);
                            continue;
                        }
                    };
                    if body.base64_encoded {
                        debug!("Skipping binary response body of {}", url);
                        continue;
                    }
                    match serde_json::from_str(&body.body) {
                        Ok(json) => captured.lock().await.push(CapturedResponse { url, body: json }),
                        Err(e) => debug!("Response of {} is not JSON: {}", url, e),
                    }
                }
                else => break,
            }
        }
    }))
}

struct ChromePage {
    page: Page,
    captured: Arc<Mutex<Vec<CapturedResponse>>>,
    capture_task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl PageHandle for ChromePage {
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| XhsError::Timeout(format!("waiting for selector {}", selector)))
    }

    async fn cookies(&self) -> Result<Vec<BrowserCookie>> {
        let cookies = self.page.get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| BrowserCookie::new(c.name, c.value))
            .collect())
    }

    async fn screenshot_element(&self, selector: &str) -> Result<Vec<u8>> {
        let element = self.page.find_element(selector).await?;
        Ok(element.screenshot(CaptureScreenshotFormat::Png).await?)
    }

    async fn screenshot_page(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn captured_responses(&self) -> Vec<CapturedResponse> {
        self.captured.lock().await.clone()
    }

    async fn close(&self) -> Result<()> {
        if let Some(task) = self.capture_task.lock().await.take() {
            task.abort();
        }
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| XhsError::Browser(format!("Failed to close page: {}", e)))
    }
}
