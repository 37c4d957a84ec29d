//! QR-code login sessions.
//!
//! A login attempt opens the site's login page in the browser, serves its
//! QR code to the user, and watches the page's cookie jar until the user
//! scans it with the mobile app.
//!
//! # Lifecycle
//!
//! ```text
//!   [none] --create--> pending
//!   pending --marker cookie found--> success
//!   pending --cookie read error----> failed
//!   pending --TTL elapsed----------> expired
//!   terminal --grace period--------> [removed]
//! ```
//!
//! Sessions live in a [`SessionStore`] owned by a single worker task
//! ([`LoginManager`]); everything else talks to it through a cloneable
//! [`LoginHandle`].
//!
//! ```rust,ignore
//! let login = spawn_login_manager(LoginConfig::default(), browser, active_cookie.clone());
//! let id = login.create_session().await?;
//! let png = login.qrcode(&id).await?;
//! let status = login.status(&id).await;
//! ```

mod config;
mod cookie;
mod landing;
mod manager;
mod session;
mod store;

pub use config::LoginConfig;
pub use cookie::{logged_in_cookie, ActiveCookie};
pub use landing::{render_landing_page, STATUS_POLL_INTERVAL_MS};
pub use manager::{spawn_login_manager, LoginHandle, LoginManager, QrCodeError};
pub use session::{LoginSession, SessionStatus, StatusView};
pub use store::SessionStore;
