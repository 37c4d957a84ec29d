//! Feeds built from the site's pages.
//!
//! ```text
//! /user/{id}/notes    Fetcher → SSR state → notes[0]
//! /board/{id}         Fetcher → SSR state → boardFeedsMap[id]
//! /user/{id}/collect  Browser → { SSR notes[1], captured API, DOM } → merge
//! ```

mod board;
mod collect;
pub mod urls;
mod user;

pub use board::board_feed;
pub use collect::collect_feed;
pub use user::user_notes_feed;

use crate::domain::{Feed, Item, NoteCard};
use crate::render::note_description;

/// Turn cards into feed entries linking back to each note
pub fn append_notes(feed: &mut Feed, base_url: &str, cards: Vec<NoteCard>) {
    for card in cards {
        let mut item = Item::new(&feed.link, &card.id);
        item.title = card.title.clone();
        item.link = urls::note_url(base_url, &card.id, card.xsec_token.as_deref())
            .ok()
            .map(String::from);
        item.description = Some(note_description(&card));
        item.author = card.author.clone();
        item.published_at = card.published_at;
        feed.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_notes() {
        let mut feed = Feed::new("f", "https://www.xiaohongshu.com/board/b1");
        let mut card = NoteCard::new("n1");
        card.title = Some("Noodles".into());
        card.author = Some("Bob".into());
        card.xsec_token = Some("tok".into());

        append_notes(&mut feed, "https://www.xiaohongshu.com", vec![card, NoteCard::new("n2")]);

        assert_eq!(feed.items.len(), 2);
        let item = &feed.items[0];
        assert_eq!(item.title.as_deref(), Some("Noodles"));
        assert_eq!(item.author.as_deref(), Some("Bob"));
        assert_eq!(
            item.link.as_deref(),
            Some("https://www.xiaohongshu.com/explore/n1?xsec_token=tok&xsec_source=pc_user")
        );
        assert_eq!(item.guid, Item::generate_guid(&feed.link, "n1"));
        assert_ne!(feed.items[0].guid, feed.items[1].guid);
    }
}
