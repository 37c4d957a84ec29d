use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_MONITOR_INTERVAL_MS: u64 = 100;

/// Configuration for QR login sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Page that shows the login QR code
    pub login_url: String,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Seconds to wait for the QR code to render (default: 15)
    pub qr_timeout_secs: u64,

    /// Cookie check interval in milliseconds (default: 2000, floor: 100)
    pub monitor_interval_ms: u64,

    /// Upper bound on a single cookie read in seconds (default: 5)
    pub cookie_read_timeout_secs: u64,

    /// Upper bound on a single screenshot in seconds (default: 10)
    pub screenshot_timeout_secs: u64,

    /// Lifetime of a login attempt in seconds (default: 180)
    pub ttl_secs: u64,

    /// How long a finished session stays pollable in seconds (default: 60)
    pub removal_grace_secs: u64,

    /// Cookie whose presence means the user has logged in
    pub cookie_marker: String,

    /// QR code selectors, tried in order
    pub qr_selectors: Vec<String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            login_url: "https://www.xiaohongshu.com/explore".to_string(),
            viewport_width: 1280,
            viewport_height: 800,
            qr_timeout_secs: 15,
            monitor_interval_ms: 2000,
            cookie_read_timeout_secs: 5,
            screenshot_timeout_secs: 10,
            ttl_secs: 180,
            removal_grace_secs: 60,
            cookie_marker: "web_session".to_string(),
            qr_selectors: vec![
                ".qrcode-img".to_string(),
                ".login-container .qrcode img".to_string(),
                "img[class*=\"qrcode\"]".to_string(),
                "canvas".to_string(),
            ],
        }
    }
}

impl LoginConfig {
    pub fn qr_timeout(&self) -> Duration {
        Duration::from_secs(self.qr_timeout_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms.max(MIN_MONITOR_INTERVAL_MS))
    }

    pub fn cookie_read_timeout(&self) -> Duration {
        Duration::from_secs(self.cookie_read_timeout_secs)
    }

    pub fn screenshot_timeout(&self) -> Duration {
        Duration::from_secs(self.screenshot_timeout_secs)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn removal_grace(&self) -> Duration {
        Duration::from_secs(self.removal_grace_secs)
    }

    /// All QR selectors as one CSS selector list, matching whichever renders first
    pub fn qr_selector_list(&self) -> String {
        self.qr_selectors.join(", ")
    }
}
