use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::Keyed;

/// Summary of one note as shown in a profile, collect or board listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteCard {
    pub id: String,
    pub title: Option<String>,
    pub cover: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<String>,
    pub liked_count: Option<String>,
    pub xsec_token: Option<String>,
    pub is_video: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl NoteCard {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            cover: None,
            author: None,
            author_id: None,
            liked_count: None,
            xsec_token: None,
            is_video: false,
            published_at: None,
        }
    }

    /// Build a card from any of the JSON shapes the site uses.
    ///
    /// SSR state wraps cards as `{id, noteCard: {...}}` with camelCase keys,
    /// the web API returns flat snake_case objects. Returns `None` when no
    /// note id can be found.
    pub fn from_value(value: &Value) -> Option<Self> {
        let card = value.get("noteCard").unwrap_or(value);

        let id = text(value, &["id", "noteId", "note_id"])
            .or_else(|| text(card, &["noteId", "note_id", "id"]))?;

        let cover = card.get("cover").and_then(|c| {
            text(c, &["urlDefault", "url_default", "url"]).or_else(|| {
                c.get("infoList")
                    .or_else(|| c.get("info_list"))
                    .and_then(Value::as_array)
                    .and_then(|list| list.iter().find_map(|i| text(i, &["url"])))
            })
        });

        let user = card.get("user");
        let interact = card.get("interactInfo").or_else(|| card.get("interact_info"));

        let published_at = ["time", "lastUpdateTime", "last_update_time"]
            .iter()
            .find_map(|k| card.get(*k).and_then(Value::as_i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Some(Self {
            id,
            title: text(card, &["displayTitle", "display_title", "title"]),
            cover,
            author: user.and_then(|u| text(u, &["nickname", "nickName", "nick_name"])),
            author_id: user.and_then(|u| text(u, &["userId", "user_id"])),
            liked_count: interact.and_then(|i| text(i, &["likedCount", "liked_count"])),
            xsec_token: text(value, &["xsecToken", "xsec_token"])
                .or_else(|| text(card, &["xsecToken", "xsec_token"])),
            is_video: text(card, &["type"]).is_some_and(|t| t == "video"),
            published_at,
        })
    }

    /// Cards from a JSON array, skipping entries without an id
    pub fn from_array(value: &Value) -> Vec<Self> {
        value
            .as_array()
            .map(|notes| notes.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }
}

impl Keyed for NoteCard {
    fn key(&self) -> &str {
        &self.id
    }
}

/// First non-empty string (or number rendered as string) under one of `keys`
fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match value.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
