use tracing::{debug, info, warn};

use crate::app::{Result, XhsError};
use crate::browser::{BrowserConfig, BrowserProvider, PageGuard, PageHandle, PageRequest};
use crate::domain::{Feed, NoteCard};
use crate::extract::{
    extract_initial_state, merge_strategies, pointer, scrape_note_cards, StrategyOutput,
};
use crate::site::user::Profile;
use crate::site::{append_notes, urls};

const NOTE_CARD_SELECTOR: &str = "section.note-item";

/// Feed of the notes a user collected.
///
/// The collect tab is only rendered for a logged-in visitor, so this drives
/// a browser page with `cookie` installed and combines every source of
/// cards the page offers.
pub async fn collect_feed(
    browser: &dyn BrowserProvider,
    config: &BrowserConfig,
    base_url: &str,
    user_id: &str,
    cookie: Option<&str>,
) -> Result<Feed> {
    let cookie = cookie.ok_or(XhsError::MissingCookie)?;
    let url = urls::collect_url(base_url, user_id)?;

    let request = PageRequest::new(url.as_str())
        .cookie(cookie, urls::cookie_domain(base_url)?)
        .capture(urls::COLLECT_API);
    let page = PageGuard::new(browser.open_page(request).await?, config.timeout());

    let scraped = scrape_collect_page(page.page(), config, base_url).await;
    if let Err(e) = page.close().await {
        warn!("Failed to close collect page: {}", e);
    }
    let (profile, cards) = scraped?;

    let link = urls::profile_url(base_url, user_id)?;
    let mut feed = Feed::new(format!("{} - collect", profile.name(user_id)), link.as_str());
    feed.description = profile.desc.clone().unwrap_or_default();
    feed.image = profile.avatar.clone();
    append_notes(&mut feed, base_url, cards);

    info!(user_id, items = feed.items.len(), "built collect feed");
    Ok(feed)
}

async fn scrape_collect_page(
    page: &dyn PageHandle,
    config: &BrowserConfig,
    base_url: &str,
) -> Result<(Profile, Vec<NoteCard>)> {
    if let Err(e) = page.wait_for_selector(NOTE_CARD_SELECTOR, config.timeout()).await {
        debug!("Note cards did not render: {}", e);
    }
    // Give the collect API call time to land
    tokio::time::sleep(config.capture_wait()).await;

    let html = match tokio::time::timeout(config.timeout(), page.content()).await {
        Ok(Ok(html)) => Some(html),
        Ok(Err(e)) => {
            debug!("Could not read page content: {}", e);
            None
        }
        Err(_) => {
            debug!("Timed out reading page content");
            None
        }
    };

    let state = html.as_deref().and_then(|html| match extract_initial_state(html) {
        Ok(state) => Some(state),
        Err(e) => {
            debug!("No SSR state on collect page: {}", e);
            None
        }
    });
    let profile = state.as_ref().map(Profile::from_state).unwrap_or_default();

    let ssr = state
        .as_ref()
        .and_then(|s| pointer(s, "user/notes/1"))
        .filter(|v| v.is_array())
        .map(NoteCard::from_array);
    let api = captured_notes(page).await;
    let dom = html.as_deref().map(|html| scrape_note_cards(html, base_url));

    let cards = merge_strategies(vec![
        StrategyOutput::new("ssr", ssr),
        StrategyOutput::new("api", api),
        StrategyOutput::new("dom", dom),
    ])?;

    Ok((profile, cards))
}

/// Cards from every captured collect API page, in capture order
async fn captured_notes(page: &dyn PageHandle) -> Option<Vec<NoteCard>> {
    let pages: Vec<Vec<NoteCard>> = page
        .captured_responses()
        .await
        .iter()
        .filter(|r| r.url.contains(urls::COLLECT_API))
        .filter_map(|r| pointer(&r.body, "data/notes").filter(|v| v.is_array()))
        .map(NoteCard::from_array)
        .collect();

    if pages.is_empty() {
        None
    } else {
        Some(pages.into_iter().flatten().collect())
    }
}
