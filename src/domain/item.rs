use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One RSS entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub guid: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(feed_link: &str, entry_id: &str) -> Self {
        Self {
            guid: Self::generate_guid(feed_link, entry_id),
            title: None,
            link: None,
            description: None,
            author: None,
            published_at: None,
        }
    }

    /// Generate a deterministic guid from the feed link and entry id
    pub fn generate_guid(feed_link: &str, entry_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(feed_link.as_bytes());
        hasher.update(entry_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_generation_deterministic() {
        let id1 = Item::generate_guid("https://www.xiaohongshu.com/user/profile/u1", "n1");
        let id2 = Item::generate_guid("https://www.xiaohongshu.com/user/profile/u1", "n1");
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_guid_generation_different_inputs() {
        let id1 = Item::generate_guid("https://www.xiaohongshu.com/user/profile/u1", "n1");
        let id2 = Item::generate_guid("https://www.xiaohongshu.com/user/profile/u1", "n2");
        let id3 = Item::generate_guid("https://www.xiaohongshu.com/board/b1", "n1");
        assert_ne!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_guid_is_hex_sha256() {
        let id = Item::generate_guid("feed", "entry");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_display_title() {
        let mut item = Item::new("feed", "e1");
        assert_eq!(item.display_title(), "(Untitled)");
        item.title = Some("Weekend hike".into());
        assert_eq!(item.display_title(), "Weekend hike");
    }
}
