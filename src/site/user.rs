use serde_json::Value;
use tracing::{debug, info};

use crate::app::Result;
use crate::domain::{Feed, NoteCard};
use crate::extract::{extract_initial_state, merge_unique, pointer};
use crate::fetcher::Fetcher;
use crate::site::{append_notes, urls};

/// Channel metadata from the SSR profile block
#[derive(Debug, Default)]
pub(crate) struct Profile {
    pub nickname: Option<String>,
    pub desc: Option<String>,
    pub avatar: Option<String>,
}

impl Profile {
    pub(crate) fn from_state(state: &Value) -> Self {
        let info = pointer(state, "user/userPageData/basicInfo");
        let field = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Self {
            nickname: field("nickname"),
            desc: field("desc"),
            avatar: field("imageb").or_else(|| field("images")),
        }
    }

    pub(crate) fn name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.nickname.as_deref().unwrap_or(user_id)
    }
}

/// Feed of the notes a user published
pub async fn user_notes_feed(
    fetcher: &dyn Fetcher,
    base_url: &str,
    user_id: &str,
    cookie: Option<&str>,
) -> Result<Feed> {
    let url = urls::profile_url(base_url, user_id)?;
    let html = fetcher.fetch(url.as_str(), cookie).await?;
    let state = extract_initial_state(&html)?;

    let profile = Profile::from_state(&state);
    let notes = merge_unique([pointer(&state, "user/notes/0").map(NoteCard::from_array)]);
    if notes.is_empty() {
        debug!(user_id, "profile has no notes in SSR state");
    }

    let mut feed = Feed::new(format!("{} - notes", profile.name(user_id)), url.as_str());
    feed.description = profile.desc.clone().unwrap_or_default();
    feed.image = profile.avatar.clone();
    append_notes(&mut feed, base_url, notes);

    info!(user_id, items = feed.items.len(), "built user notes feed");
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::XhsError;
    use crate::testing::FakeFetcher;

    const BASE: &str = "https://www.xiaohongshu.com";
    const PROFILE: &str = "https://www.xiaohongshu.com/user/profile/u1";

    fn page(state: &str) -> String {
        format!("<html><body><script>window.__INITIAL_STATE__={}</script></body></html>", state)
    }

    #[tokio::test]
    async fn test_user_notes_feed() {
        let html = page(
            r#"{"user":{"userPageData":{"basicInfo":{"nickname":"Alice","desc":"hiking","imageb":"https://img/a.jpg"}},
               "notes":[[{"id":"n1","noteCard":{"displayTitle":"Hike","xsecToken":"t1"}},
                         {"id":"n2","noteCard":{"displayTitle":"Lake","user":{"nickname":"Alice"}}}],[]],
               "activeTab":undefined}}"#,
        );
        let fetcher = FakeFetcher::new().with_page(PROFILE, &html);

        let feed = user_notes_feed(&fetcher, BASE, "u1", Some("web_session=abc"))
            .await
            .unwrap();

        assert_eq!(feed.title, "Alice - notes");
        assert_eq!(feed.link, PROFILE);
        assert_eq!(feed.description, "hiking");
        assert_eq!(feed.image.as_deref(), Some("https://img/a.jpg"));
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].title.as_deref(), Some("Hike"));
        assert_eq!(fetcher.cookies(), vec![Some("web_session=abc".to_string())]);
    }

    #[tokio::test]
    async fn test_repeated_notes_appear_once() {
        let html = page(
            r#"{"user":{"notes":[[{"id":"n1","noteCard":{"displayTitle":"First"}},
                                 {"id":"n1","noteCard":{"displayTitle":"Again"}},
                                 {"id":"n2"}]]}}"#,
        );
        let fetcher = FakeFetcher::new().with_page(PROFILE, &html);

        let feed = user_notes_feed(&fetcher, BASE, "u1", None).await.unwrap();
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].title.as_deref(), Some("First"));
        assert_ne!(feed.items[0].guid, feed.items[1].guid);
    }

    #[tokio::test]
    async fn test_no_notes_is_empty_feed() {
        let fetcher = FakeFetcher::new().with_page(PROFILE, &page(r#"{"user":{}}"#));

        let feed = user_notes_feed(&fetcher, BASE, "u1", None).await.unwrap();
        assert_eq!(feed.title, "u1 - notes");
        assert!(feed.items.is_empty());
    }

    #[tokio::test]
    async fn test_missing_state_is_parse_error() {
        let fetcher = FakeFetcher::new().with_page(PROFILE, "<html></html>");

        let err = user_notes_feed(&fetcher, BASE, "u1", None).await.unwrap_err();
        assert!(matches!(err, XhsError::Parse(_)));
    }
}
