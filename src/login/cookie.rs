use std::sync::{Arc, RwLock};

use crate::browser::BrowserCookie;

/// Process-wide slot holding the cookie of the last successful login.
///
/// Feed routes fall back to it when no cookie is configured.
/// Last write wins.
#[derive(Debug, Clone, Default)]
pub struct ActiveCookie {
    inner: Arc<RwLock<Option<String>>>,
}

impl ActiveCookie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, cookie: String) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(cookie),
            Err(poisoned) => *poisoned.into_inner() = Some(cookie),
        }
    }
}

/// Join the jar into a `Cookie` header value if it contains `marker`.
pub fn logged_in_cookie(cookies: &[BrowserCookie], marker: &str) -> Option<String> {
    if !cookies.iter().any(|c| c.name == marker && !c.value.is_empty()) {
        return None;
    }

    Some(
        cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}
