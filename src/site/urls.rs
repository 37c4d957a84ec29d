use url::Url;

use crate::app::Result;

/// Path fragment of the web API that lists a user's collected notes
pub const COLLECT_API: &str = "/api/sns/web/v2/note/collect/page";

fn join_segments(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

pub fn profile_url(base_url: &str, user_id: &str) -> Result<Url> {
    join_segments(base_url, &["user", "profile", user_id])
}

/// Profile page opened on the collect tab
pub fn collect_url(base_url: &str, user_id: &str) -> Result<Url> {
    let mut url = profile_url(base_url, user_id)?;
    url.query_pairs_mut()
        .append_pair("tab", "fav")
        .append_pair("subTab", "note");
    Ok(url)
}

pub fn board_url(base_url: &str, board_id: &str) -> Result<Url> {
    join_segments(base_url, &["board", board_id])
}

/// Public link to a note; without its xsec token the site refuses to show it
pub fn note_url(base_url: &str, note_id: &str, xsec_token: Option<&str>) -> Result<Url> {
    let mut url = join_segments(base_url, &["explore", note_id])?;
    if let Some(token) = xsec_token {
        url.query_pairs_mut()
            .append_pair("xsec_token", token)
            .append_pair("xsec_source", "pc_user");
    }
    Ok(url)
}

/// Registrable domain the session cookie belongs to, e.g. `.xiaohongshu.com`
pub fn cookie_domain(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)?;
    match url.host() {
        Some(url::Host::Domain(host)) => Ok(format!(".{}", host.trim_start_matches("www."))),
        Some(host) => Ok(host.to_string()),
        None => Err(url::ParseError::EmptyHost.into()),
    }
}
