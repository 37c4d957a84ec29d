use serde_json::Value;
use tracing::info;

use crate::app::Result;
use crate::domain::{Feed, NoteCard};
use crate::extract::{extract_initial_state, merge_unique};
use crate::fetcher::Fetcher;
use crate::site::{append_notes, urls};

/// Feed of the notes collected into a board (album)
pub async fn board_feed(
    fetcher: &dyn Fetcher,
    base_url: &str,
    board_id: &str,
    cookie: Option<&str>,
) -> Result<Feed> {
    let url = urls::board_url(base_url, board_id)?;
    let html = fetcher.fetch(url.as_str(), cookie).await?;
    let state = extract_initial_state(&html)?;

    let details = state
        .get("board")
        .and_then(|b| b.get("boardDetails"))
        .and_then(|d| d.get(board_id));
    let field = |key: &str| {
        details
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let notes = state
        .get("board")
        .and_then(|b| b.get("boardFeedsMap"))
        .and_then(|m| m.get(board_id))
        .and_then(|f| f.get("notes"))
        .map(NoteCard::from_array);
    let notes = merge_unique([notes]);

    let name = field("name").unwrap_or_else(|| board_id.to_string());
    let mut feed = Feed::new(format!("{} - board", name), url.as_str());
    feed.description = field("desc").unwrap_or_default();
    append_notes(&mut feed, base_url, notes);

    info!(board_id, items = feed.items.len(), "built board feed");
    Ok(feed)
}
