use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the headless browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page load timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// How long to keep capturing API responses after the page settles,
    /// in milliseconds (default: 3000)
    pub capture_wait_ms: u64,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            capture_wait_ms: 3000,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl BrowserConfig {
    /// Get the page load timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the response capture window as a Duration
    pub fn capture_wait(&self) -> Duration {
        Duration::from_millis(self.capture_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.capture_wait_ms, 3000);
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_durations() {
        let config = BrowserConfig {
            timeout_secs: 15,
            capture_wait_ms: 500,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.capture_wait(), Duration::from_millis(500));
    }
}
