//! Configuration management for xhsfeed.
//!
//! Configuration is read from `~/.config/xhsfeed/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::browser::BrowserConfig;
use crate::login::LoginConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub login: LoginConfig,
    pub cache: CacheConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1200,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Target site settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site origin, without trailing slash
    pub base_url: String,

    /// Cookie string sent with every request. Takes precedence over
    /// the cookie obtained through a QR login.
    pub cookie: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.xiaohongshu.com".to_string(),
            cookie: None,
        }
    }
}

impl SiteConfig {
    /// The configured cookie, ignoring blank values
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Feed cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/xhsfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("xhsfeed").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# xhsfeed configuration

[server]
host = "127.0.0.1"
port = 1200

[site]
base_url = "https://www.xiaohongshu.com"
# Cookie copied from a logged-in browser session. When unset, the cookie
# captured by the last successful QR login (/login) is used instead.
# cookie = "web_session=...; a1=..."

[browser]
# Run browser in headless mode (no visible window)
headless = true

# Page load timeout in seconds
timeout_secs = 30

# How long to keep listening for API responses after the page settles (milliseconds)
capture_wait_ms = 3000

[login]
login_url = "https://www.xiaohongshu.com/explore"
viewport_width = 1280
viewport_height = 800

# Seconds to wait for the QR code to render
qr_timeout_secs = 15

# How often the login page is checked for the session cookie (milliseconds)
monitor_interval_ms = 2000

# Lifetime of a login attempt, and how long its result stays pollable afterwards
ttl_secs = 180
removal_grace_secs = 60

# Cookie whose presence marks a completed login
cookie_marker = "web_session"

# Tried in order when taking the QR screenshot
qr_selectors = [
    ".qrcode-img",
    ".login-container .qrcode img",
    "img[class*=\"qrcode\"]",
    "canvas",
]

[cache]
# Seconds a generated feed is reused
ttl_secs = 300
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
