use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::NoteCard;

/// Scrape note cards from a rendered listing page (`section.note-item`).
///
/// `base_url` resolves relative links. Cards whose note id cannot be
/// recovered from any link are skipped.
pub fn scrape_note_cards(html: &str, base_url: &str) -> Vec<NoteCard> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let (Ok(item), Ok(link), Ok(title), Ok(author), Ok(likes), Ok(image), Ok(video)) = (
        Selector::parse("section.note-item"),
        Selector::parse("a[href]"),
        Selector::parse(".footer .title"),
        Selector::parse(".author .name"),
        Selector::parse(".like-wrapper .count"),
        Selector::parse("a.cover img, img"),
        Selector::parse(".play-icon"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    document
        .select(&item)
        .filter_map(|section| {
            let links: Vec<_> = section
                .select(&link)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| base.join(href).ok())
                .filter_map(|url| note_link(&url))
                .collect();
            let id = links.first()?.0.clone();

            let mut card = NoteCard::new(id);
            card.xsec_token = links
                .iter()
                .filter(|(link_id, _)| *link_id == card.id)
                .find_map(|(_, token)| token.clone());
            card.title = first_text(&section, &title);
            card.author = first_text(&section, &author);
            card.liked_count = first_text(&section, &likes);
            card.cover = section
                .select(&image)
                .filter_map(|img| img.value().attr("src"))
                .find(|src| !src.is_empty() && !src.starts_with("data:"))
                .map(String::from);
            card.is_video = section.select(&video).next().is_some();
            Some(card)
        })
        .collect()
}

/// Note id and xsec token from a note link.
///
/// Recognises `/explore/{id}`, `/discovery/item/{id}` and
/// `/user/profile/{user}/{id}`.
fn note_link(url: &Url) -> Option<(String, Option<String>)> {
    let segments: Vec<_> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let id = match segments.as_slice() {
        ["explore", id] | ["discovery", "item", id] | ["user", "profile", _, id] => *id,
        _ => return None,
    };
    let token = url
        .query_pairs()
        .find(|(k, _)| k == "xsec_token")
        .map(|(_, v)| v.into_owned());
    Some((id.to_string(), token))
}

fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}
