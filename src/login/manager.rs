use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::{Result, XhsError};
use crate::browser::{BrowserCookie, BrowserProvider, PageHandle, PageRequest};
use crate::login::cookie::logged_in_cookie;
use crate::login::{ActiveCookie, LoginConfig, LoginSession, SessionStore, StatusView};

const PAGE_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a QR code could not be served
#[derive(Debug, thiserror::Error)]
pub enum QrCodeError {
    #[error("session is not active")]
    Inactive,

    #[error("QR code unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of one cookie read on a login page
#[derive(Debug)]
enum CookieRead {
    Jar(Vec<BrowserCookie>),
    TimedOut,
    Failed(String),
}

/// Events drained by the login worker
enum LoginMessage {
    Register {
        page: Arc<dyn PageHandle>,
        reply: oneshot::Sender<String>,
    },
    Status {
        id: String,
        reply: oneshot::Sender<Option<StatusView>>,
    },
    LendPage {
        id: String,
        reply: oneshot::Sender<Option<Arc<dyn PageHandle>>>,
    },
    List {
        reply: oneshot::Sender<Vec<String>>,
    },
    MonitorTick(String),
    CookiesRead {
        id: String,
        result: CookieRead,
    },
    Expire(String),
    Remove(String),
    Shutdown,
}

/// Handle to the login worker
#[derive(Clone)]
pub struct LoginHandle {
    tx: mpsc::Sender<LoginMessage>,
    browser: Arc<dyn BrowserProvider>,
    config: Arc<LoginConfig>,
}

impl LoginHandle {
    /// Open the login page, wait for its QR code and register a pending session.
    ///
    /// On failure the page is closed and no session exists. The page is
    /// driven on its own task, so a caller that stops waiting does not
    /// leave it open.
    pub async fn create_session(&self) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        tokio::spawn(open_session(
            self.browser.clone(),
            self.config.clone(),
            self.tx.clone(),
            reply,
        ))
        .await
        .map_err(|e| XhsError::Other(format!("Login page task failed: {}", e)))??;

        rx.await
            .map_err(|_| XhsError::Other("Login manager dropped the session".to_string()))
    }

    /// Current projection of a session, `None` when it does not exist
    pub async fn status(&self, id: &str) -> Option<StatusView> {
        let (reply, rx) = oneshot::channel();
        let message = LoginMessage::Status {
            id: id.to_string(),
            reply,
        };
        self.request(message, rx).await.flatten()
    }

    /// PNG of the session's QR code.
    ///
    /// Tries each configured selector in order and falls back to a
    /// full-page screenshot.
    pub async fn qrcode(&self, id: &str) -> std::result::Result<Vec<u8>, QrCodeError> {
        let (reply, rx) = oneshot::channel();
        let message = LoginMessage::LendPage {
            id: id.to_string(),
            reply,
        };
        let page = self
            .request(message, rx)
            .await
            .flatten()
            .ok_or(QrCodeError::Inactive)?;

        let timeout = self.config.screenshot_timeout();
        for selector in &self.config.qr_selectors {
            match tokio::time::timeout(timeout, page.screenshot_element(selector)).await {
                Ok(Ok(png)) => return Ok(png),
                Ok(Err(e)) => debug!(session_id = %id, selector = %selector, "QR screenshot failed: {}", e),
                Err(_) => debug!(session_id = %id, selector = %selector, "QR screenshot timed out"),
            }
        }

        match tokio::time::timeout(timeout, page.screenshot_page()).await {
            Ok(Ok(png)) => Ok(png),
            Ok(Err(e)) => Err(QrCodeError::Unavailable(e.to_string())),
            Err(_) => Err(QrCodeError::Unavailable("screenshot timed out".to_string())),
        }
    }

    /// Ids of every session still held by the worker
    pub async fn sessions(&self) -> Vec<String> {
        let (reply, rx) = oneshot::channel();
        self.request(LoginMessage::List { reply }, rx)
            .await
            .unwrap_or_default()
    }

    /// Stop the worker and close every open login page
    pub async fn shutdown(&self) {
        let _ = self.tx.send(LoginMessage::Shutdown).await;
    }

    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    async fn request<T>(&self, message: LoginMessage, rx: oneshot::Receiver<T>) -> Option<T> {
        if self.tx.send(message).await.is_err() {
            warn!("Login manager is not running");
            return None;
        }
        rx.await.ok()
    }
}

/// Worker that owns every login session.
///
/// All session mutations happen on this task, one message at a time.
/// Browser calls run elsewhere and report back through the queue, so a
/// result that arrives after a session finished is simply discarded.
pub struct LoginManager {
    config: Arc<LoginConfig>,
    store: SessionStore,
    active_cookie: ActiveCookie,
    rx: mpsc::Receiver<LoginMessage>,
    tx: mpsc::WeakSender<LoginMessage>,
}

impl LoginManager {
    /// Create a new login worker and return a handle to communicate with it
    pub fn new(
        config: LoginConfig,
        browser: Arc<dyn BrowserProvider>,
        active_cookie: ActiveCookie,
    ) -> (Self, LoginHandle) {
        let (tx, rx) = mpsc::channel(100);
        let config = Arc::new(config);
        let manager = Self {
            config: config.clone(),
            store: SessionStore::new(),
            active_cookie,
            rx,
            tx: tx.downgrade(),
        };
        let handle = LoginHandle {
            tx,
            browser,
            config,
        };
        (manager, handle)
    }

    /// Run the worker loop
    pub async fn run(mut self) {
        info!("Login manager started");

        while let Some(msg) = self.rx.recv().await {
            match msg {
                LoginMessage::Register { page, reply } => {
                    let id = self.register(page);
                    if reply.send(id.clone()).is_err() {
                        debug!(session_id = %id, "Session creator went away");
                        self.discard(&id);
                    }
                }
                LoginMessage::Status { id, reply } => {
                    let _ = reply.send(self.store.get(&id).map(LoginSession::view));
                }
                LoginMessage::LendPage { id, reply } => {
                    let page = self
                        .store
                        .get(&id)
                        .filter(|s| s.is_pending())
                        .and_then(|s| s.page.clone());
                    let _ = reply.send(page);
                }
                LoginMessage::List { reply } => {
                    let _ = reply.send(self.store.list());
                }
                LoginMessage::MonitorTick(id) => self.on_monitor_tick(&id),
                LoginMessage::CookiesRead { id, result } => self.on_cookies_read(&id, result),
                LoginMessage::Expire(id) => self.on_expire(&id),
                LoginMessage::Remove(id) => {
                    if self.store.remove(&id).is_some() {
                        debug!(session_id = %id, "Login session removed");
                    }
                }
                LoginMessage::Shutdown => {
                    info!("Login manager shutting down");
                    break;
                }
            }
        }

        for mut session in self.store.drain() {
            abort_timers(&mut session);
            if let Some(page) = session.page.take() {
                release_page(session.id(), page).await;
            }
        }
    }

    fn register(&mut self, page: Arc<dyn PageHandle>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut session = LoginSession::new(id.clone(), page, self.config.ttl());

        if let Some(tx) = self.tx.upgrade() {
            session.monitor_timer = Some(spawn_monitor(
                tx.clone(),
                id.clone(),
                self.config.monitor_interval(),
            ));
            session.expire_timer = Some(spawn_after(
                tx,
                self.config.ttl(),
                LoginMessage::Expire(id.clone()),
            ));
        }

        self.store.insert(session);
        info!(session_id = %id, "Login session created");
        id
    }

    /// Drop a session nobody holds the id of
    fn discard(&mut self, id: &str) {
        let Some(mut session) = self.store.remove(id) else {
            return;
        };
        abort_timers(&mut session);
        if let Some(page) = session.page.take() {
            let id = id.to_string();
            tokio::spawn(async move { release_page(&id, page).await });
        }
    }

    fn on_monitor_tick(&mut self, id: &str) {
        let Some(session) = self.store.get_mut(id) else {
            return;
        };
        if !session.is_pending() || session.cookie_read_in_flight {
            return;
        }
        let (Some(page), Some(tx)) = (session.page.clone(), self.tx.upgrade()) else {
            return;
        };

        session.cookie_read_in_flight = true;
        let timeout = self.config.cookie_read_timeout();
        let id = id.to_string();

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, page.cookies()).await {
                Ok(Ok(jar)) => CookieRead::Jar(jar),
                Ok(Err(e)) => CookieRead::Failed(e.to_string()),
                Err(_) => CookieRead::TimedOut,
            };
            let _ = tx.send(LoginMessage::CookiesRead { id, result }).await;
        });
    }

    fn on_cookies_read(&mut self, id: &str, result: CookieRead) {
        let Some(session) = self.store.get_mut(id) else {
            debug!(session_id = %id, "Discarding cookie read for removed session");
            return;
        };
        session.cookie_read_in_flight = false;

        if !session.is_pending() {
            debug!(
                session_id = %id,
                status = %session.status(),
                "Discarding cookie read for finished session"
            );
            return;
        }

        match result {
            CookieRead::Jar(jar) => {
                let Some(cookie) = logged_in_cookie(&jar, &self.config.cookie_marker) else {
                    return;
                };
                self.active_cookie.set(cookie.clone());
                session.succeed(cookie);
                info!(session_id = %id, "Login succeeded");
            }
            CookieRead::TimedOut => {
                debug!(session_id = %id, "Cookie read timed out");
                return;
            }
            CookieRead::Failed(error) => {
                warn!(session_id = %id, "Login failed: {}", error);
                session.fail(error);
            }
        }

        cleanup(session, &self.tx, self.config.removal_grace());
    }

    fn on_expire(&mut self, id: &str) {
        let Some(session) = self.store.get_mut(id) else {
            return;
        };
        if session.expire() {
            info!(session_id = %id, "Login session expired");
            cleanup(session, &self.tx, self.config.removal_grace());
        }
    }
}

/// Release a finished session's resources.
///
/// Cancels its timers, closes its page, and arms the removal timer unless
/// it is already armed. Returns whether this call armed the removal timer.
fn cleanup(
    session: &mut LoginSession,
    tx: &mpsc::WeakSender<LoginMessage>,
    grace: Duration,
) -> bool {
    if let Some(timer) = session.monitor_timer.take() {
        timer.abort();
    }
    if let Some(timer) = session.expire_timer.take() {
        timer.abort();
    }

    if let Some(page) = session.page.take() {
        let id = session.id().to_string();
        tokio::spawn(async move { release_page(&id, page).await });
    }

    if session.removal_timer.is_some() {
        return false;
    }
    let Some(tx) = tx.upgrade() else {
        return false;
    };
    session.removal_timer = Some(spawn_after(
        tx,
        grace,
        LoginMessage::Remove(session.id().to_string()),
    ));
    true
}

fn abort_timers(session: &mut LoginSession) {
    for timer in [
        session.monitor_timer.take(),
        session.expire_timer.take(),
        session.removal_timer.take(),
    ]
    .into_iter()
    .flatten()
    {
        timer.abort();
    }
}

async fn open_session(
    browser: Arc<dyn BrowserProvider>,
    config: Arc<LoginConfig>,
    tx: mpsc::Sender<LoginMessage>,
    reply: oneshot::Sender<String>,
) -> Result<()> {
    let request = PageRequest::new(config.login_url.clone())
        .viewport(config.viewport_width, config.viewport_height);
    let page = browser.open_page(request).await?;

    if let Err(e) = page
        .wait_for_selector(&config.qr_selector_list(), config.qr_timeout())
        .await
    {
        warn!("QR code did not render: {}", e);
        release_page("unregistered", page).await;
        return Err(e);
    }

    if reply.is_closed() {
        debug!("Login page requester went away before registration");
        release_page("unregistered", page).await;
        return Ok(());
    }

    let message = LoginMessage::Register {
        page: page.clone(),
        reply,
    };
    if tx.send(message).await.is_err() {
        release_page("unregistered", page).await;
        return Err(XhsError::Other("Login manager is not running".to_string()));
    }
    Ok(())
}

/// Close a page, logging instead of failing
async fn release_page(id: &str, page: Arc<dyn PageHandle>) {
    match tokio::time::timeout(PAGE_CLOSE_TIMEOUT, page.close()).await {
        Ok(Ok(())) => debug!(session_id = %id, "Login page closed"),
        Ok(Err(e)) => warn!(session_id = %id, "Failed to close login page: {}", e),
        Err(_) => warn!(session_id = %id, "Timed out closing login page"),
    }
}

fn spawn_monitor(tx: mpsc::Sender<LoginMessage>, id: String, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        loop {
            ticker.tick().await;
            if tx.send(LoginMessage::MonitorTick(id.clone())).await.is_err() {
                break;
            }
        }
    })
}

fn spawn_after(
    tx: mpsc::Sender<LoginMessage>,
    delay: Duration,
    message: LoginMessage,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(message).await;
    })
}

/// Spawn the login worker as a tokio task
pub fn spawn_login_manager(
    config: LoginConfig,
    browser: Arc<dyn BrowserProvider>,
    active_cookie: ActiveCookie,
) -> LoginHandle {
    let (manager, handle) = LoginManager::new(config, browser, active_cookie);

    tokio::spawn(async move {
        manager.run().await;
    });

    handle
}
