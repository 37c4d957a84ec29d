//! # xhsfeed
//!
//! RSS feeds for Xiaohongshu profiles, collections and boards, with a
//! QR-code login flow for the pages that need a logged-in visitor.
//!
//! ## Architecture
//!
//! ```text
//! HTTP → routes → site::{user, board, collect} → extract → render
//!          │                │          │
//!          │             Fetcher   BrowserProvider
//!          ▼
//!      login worker → ActiveCookie
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve feeds on 127.0.0.1:1200
//! xhsfeed serve
//!
//! # Log in by scanning a QR code with the mobile app
//! xhsfeed login
//!
//! # Print one feed
//! xhsfeed user 5ff0e6410000000001008400 --collect
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// the browser, the feed cache and the login worker.
pub mod app;

/// Headless browser access.
///
/// - [`BrowserProvider`](browser::BrowserProvider) / [`PageHandle`](browser::PageHandle): the seam
/// - [`ChromeBrowser`](browser::ChromeBrowser): chromiumoxide implementation
pub mod browser;

/// Get-or-compute feed cache.
pub mod cache;

/// Command-line interface using clap.
///
/// - `serve [--host] [--port]` - Run the HTTP server
/// - `login` - Serve and open the QR login page
/// - `user <id> [--collect]` - Print a user's feed
/// - `board <id>` - Print a board's feed
pub mod cli;

/// Configuration loaded from `~/.config/xhsfeed/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): RSS channel
/// - [`Item`](domain::Item): Entries with SHA256 guids
/// - [`NoteCard`](domain::NoteCard): A note as the site lists it
pub mod domain;

/// Pure extraction: SSR state, DOM scraping, strategy merging.
pub mod extract;

/// HTTP fetching of server-rendered pages.
pub mod fetcher;

/// QR-code login sessions.
pub mod login;

/// RSS 2.0 output.
pub mod render;

/// axum router and handlers.
pub mod routes;

/// Feed builders for each page type.
pub mod site;

#[cfg(test)]
pub(crate) mod testing;
