//! RSS 2.0 output.

use html_escape::{encode_double_quoted_attribute, encode_text};
use rss::{ChannelBuilder, GuidBuilder, ImageBuilder, ItemBuilder};

use crate::domain::{Feed, NoteCard};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// HTML body of a note entry: cover, title, like count and a video marker
pub fn note_description(card: &NoteCard) -> String {
    let mut html = String::new();

    if let Some(cover) = &card.cover {
        html.push_str(&format!(
            "<img src=\"{}\" referrerpolicy=\"no-referrer\"><br>",
            encode_double_quoted_attribute(cover)
        ));
    }
    if let Some(title) = &card.title {
        html.push_str(&format!("<p>{}</p>", encode_text(title)));
    }
    if card.is_video {
        html.push_str("<p>[video]</p>");
    }
    if let Some(likes) = &card.liked_count {
        html.push_str(&format!("<p>Likes: {}</p>", encode_text(likes)));
    }

    html
}

pub fn render_rss(feed: &Feed) -> String {
    let items: Vec<_> = feed
        .items
        .iter()
        .map(|item| {
            ItemBuilder::default()
                .title(Some(item.display_title().to_string()))
                .link(item.link.clone())
                .description(item.description.clone())
                .author(item.author.clone())
                .guid(Some(
                    GuidBuilder::default()
                        .value(item.guid.clone())
                        .permalink(false)
                        .build(),
                ))
                .pub_date(item.published_at.map(|t| t.to_rfc2822()))
                .build()
        })
        .collect();

    let image = feed.image.as_ref().map(|url| {
        ImageBuilder::default()
            .url(url.clone())
            .title(feed.title.clone())
            .link(feed.link.clone())
            .build()
    });

    let description = if feed.description.is_empty() {
        feed.title.clone()
    } else {
        feed.description.clone()
    };

    ChannelBuilder::default()
        .title(feed.title.clone())
        .link(feed.link.clone())
        .description(description)
        .image(image)
        .generator(Some(format!("xhsfeed {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build()
        .to_string()
}
