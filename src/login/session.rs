use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::browser::PageHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Success,
    Expired,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Success => "success",
            SessionStatus::Expired => "expired",
            SessionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One QR login attempt.
///
/// Status, cookie and error only change through [`succeed`](Self::succeed),
/// [`fail`](Self::fail) and [`expire`](Self::expire), so `cookie` is set
/// exactly when the status is `Success` and `error` exactly when it is
/// `Failed`. The first terminal transition wins; later ones return `false`.
pub struct LoginSession {
    id: String,
    status: SessionStatus,
    created_at: DateTime<Utc>,
    ttl: Duration,
    cookie: Option<String>,
    error: Option<String>,
    pub(crate) page: Option<Arc<dyn PageHandle>>,
    pub(crate) monitor_timer: Option<JoinHandle<()>>,
    pub(crate) expire_timer: Option<JoinHandle<()>>,
    pub(crate) removal_timer: Option<JoinHandle<()>>,
    pub(crate) cookie_read_in_flight: bool,
}

impl LoginSession {
    pub fn new(id: String, page: Arc<dyn PageHandle>, ttl: Duration) -> Self {
        Self {
            id,
            status: SessionStatus::Pending,
            created_at: Utc::now(),
            ttl,
            cookie: None,
            error: None,
            page: Some(page),
            monitor_timer: None,
            expire_timer: None,
            removal_timer: None,
            cookie_read_in_flight: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == SessionStatus::Pending
    }

    pub fn has_page(&self) -> bool {
        self.page.is_some()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero())
    }

    pub fn succeed(&mut self, cookie: String) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Success;
        self.cookie = Some(cookie);
        true
    }

    pub fn fail(&mut self, error: String) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Failed;
        self.error = Some(error);
        true
    }

    pub fn expire(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Expired;
        true
    }

    pub fn view(&self) -> StatusView {
        StatusView {
            id: self.id.clone(),
            status: self.status,
            cookie: self.cookie.clone().filter(|_| self.status == SessionStatus::Success),
            error: self.error.clone(),
            expires_at: self.expires_at(),
        }
    }
}

/// What a status poll returns for an existing session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub id: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::FakePage;

    pub(crate) fn session(id: &str) -> LoginSession {
        LoginSession::new(id.to_string(), Arc::new(FakePage::new()), Duration::from_secs(180))
    }

    #[test]
    fn test_new_session_is_pending() {
        let s = session("s1");
        assert_eq!(s.status(), SessionStatus::Pending);
        assert!(s.has_page());
        assert!(s.cookie().is_none());
        assert!(s.error().is_none());
        assert_eq!(s.expires_at() - s.created_at, chrono::Duration::seconds(180));
    }

    #[test]
    fn test_success_sets_cookie_only() {
        let mut s = session("s1");
        assert!(s.succeed("web_session=abc".into()));
        assert_eq!(s.status(), SessionStatus::Success);
        assert_eq!(s.cookie(), Some("web_session=abc"));
        assert!(s.error().is_none());
    }

    #[test]
    fn test_failure_sets_error_only() {
        let mut s = session("s1");
        assert!(s.fail("cookie read failed".into()));
        assert_eq!(s.status(), SessionStatus::Failed);
        assert_eq!(s.error(), Some("cookie read failed"));
        assert!(s.cookie().is_none());
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut s = session("s1");
        assert!(s.expire());
        assert!(!s.succeed("web_session=abc".into()));
        assert!(!s.fail("late".into()));
        assert!(!s.expire());
        assert_eq!(s.status(), SessionStatus::Expired);
        assert!(s.cookie().is_none());
        assert!(s.error().is_none());
    }

    #[test]
    fn test_view_serialization() {
        let mut s = session("s1");
        s.succeed("web_session=abc".into());
        let json = serde_json::to_value(s.view()).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["status"], "success");
        assert_eq!(json["cookie"], "web_session=abc");
        assert!(json.get("error").is_none());
        assert!(json["expiresAt"].is_string());

        let pending = serde_json::to_value(session("s2").view()).unwrap();
        assert_eq!(pending["status"], "pending");
        assert!(pending.get("cookie").is_none());
    }
}
