use std::sync::Arc;

use tracing::info;

use crate::app::Result;
use crate::browser::{BrowserProvider, ChromeBrowser};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::domain::Feed;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::login::{spawn_login_manager, ActiveCookie, LoginHandle};
use crate::site::{self, urls};

/// Everything a request handler or CLI command needs.
///
/// Must be built inside a tokio runtime: the login worker is spawned here.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
    pub browser: Arc<dyn BrowserProvider>,
    pub feeds: TtlCache<Feed>,
    pub active_cookie: ActiveCookie,
    pub login: LoginHandle,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(
            config.browser.user_agent.as_deref(),
            config.browser.timeout(),
        )?);
        let browser: Arc<dyn BrowserProvider> =
            Arc::new(ChromeBrowser::new(config.browser.clone()));

        Ok(Self::with_parts(config, fetcher, browser))
    }

    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        browser: Arc<dyn BrowserProvider>,
    ) -> Self {
        let active_cookie = ActiveCookie::new();
        let login = spawn_login_manager(config.login.clone(), browser.clone(), active_cookie.clone());
        let feeds = TtlCache::new(config.cache.ttl());

        Self {
            config,
            fetcher,
            browser,
            feeds,
            active_cookie,
            login,
        }
    }

    /// Cookie for upstream requests: the configured one, else the last login's
    pub fn cookie(&self) -> Option<String> {
        self.config
            .site
            .cookie()
            .map(String::from)
            .or_else(|| self.active_cookie.get())
    }

    pub async fn user_notes(&self, user_id: &str) -> Result<Feed> {
        let base = &self.config.site.base_url;
        let key = urls::profile_url(base, user_id)?;
        let cookie = self.cookie();

        self.feeds
            .get_or_try_insert_with(key.as_str(), || {
                site::user_notes_feed(self.fetcher.as_ref(), base, user_id, cookie.as_deref())
            })
            .await
    }

    pub async fn user_collect(&self, user_id: &str) -> Result<Feed> {
        let base = &self.config.site.base_url;
        let key = urls::collect_url(base, user_id)?;
        let cookie = self.cookie();

        self.feeds
            .get_or_try_insert_with(key.as_str(), || {
                site::collect_feed(
                    self.browser.as_ref(),
                    &self.config.browser,
                    base,
                    user_id,
                    cookie.as_deref(),
                )
            })
            .await
    }

    pub async fn board(&self, board_id: &str) -> Result<Feed> {
        let base = &self.config.site.base_url;
        let key = urls::board_url(base, board_id)?;
        let cookie = self.cookie();

        self.feeds
            .get_or_try_insert_with(key.as_str(), || {
                site::board_feed(self.fetcher.as_ref(), base, board_id, cookie.as_deref())
            })
            .await
    }

    /// Stop the login worker, closing every open login page
    pub async fn shutdown(&self) {
        info!("Shutting down");
        self.login.shutdown().await;
    }
}
