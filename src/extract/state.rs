use scraper::{Html, Selector};
use serde_json::Value;

use crate::app::{Result, XhsError};

const STATE_PREFIX: &str = "window.__INITIAL_STATE__";

/// Parse the SSR state blob (`window.__INITIAL_STATE__=...`) out of a page.
pub fn extract_initial_state(html: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| XhsError::Parse(format!("Invalid selector: {}", e)))?;

    let script = document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .find(|text| text.trim_start().starts_with(STATE_PREFIX))
        .ok_or_else(|| XhsError::Parse("Page has no initial state".to_string()))?;

    let body = script
        .trim()
        .strip_prefix(STATE_PREFIX)
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .ok_or_else(|| XhsError::Parse("Malformed initial state assignment".to_string()))?
        .trim()
        .trim_end_matches(';');

    Ok(serde_json::from_str(&undefined_to_null(body))?)
}

/// Rewrite bare `undefined` tokens to `null`, leaving string literals alone.
fn undefined_to_null(source: &str) -> String {
    const TOKEN: &str = "undefined";

    let mut out = String::with_capacity(source.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if rest.starts_with(TOKEN) && !is_ident(out.chars().last()) {
            let after = rest[TOKEN.len()..].chars().next();
            if !is_ident(after) {
                out.push_str("null");
                rest = &rest[TOKEN.len()..];
                continue;
            }
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn is_ident(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Follow a `/`-separated path of object keys and array indices
pub fn pointer<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(segment),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_state_with_undefined() {
        let html = r#"<html><head>
            <script>var other = 1;</script>
            <script>window.__INITIAL_STATE__={"user":{"notes":[[{"id":"n1"}],[]],"loggedIn":undefined,"tags":[undefined,1]}}</script>
            </head><body></body></html>"#;

        let state = extract_initial_state(html).unwrap();
        assert_eq!(state["user"]["notes"][0][0]["id"], "n1");
        assert!(state["user"]["loggedIn"].is_null());
        assert!(state["user"]["tags"][0].is_null());
    }

    #[test]
    fn test_undefined_inside_strings_is_kept() {
        let rewritten = undefined_to_null(r#"{"a":"undefined","b":undefined,"c":"x\"undefined"}"#);
        assert_eq!(
            rewritten,
            r#"{"a":"undefined","b":null,"c":"x\"undefined"}"#
        );
    }

    #[test]
    fn test_identifier_containing_undefined_is_kept() {
        assert_eq!(undefined_to_null("[undefinedX,xundefined]"), "[undefinedX,xundefined]");
    }

    #[test]
    fn test_trailing_semicolon_and_spaces() {
        let html = r#"<script> window.__INITIAL_STATE__ = {"a":1}; </script>"#;
        let state = extract_initial_state(html).unwrap();
        assert_eq!(state["a"], 1);
    }

    #[test]
    fn test_missing_state_is_parse_error() {
        let err = extract_initial_state("<html><body>nothing</body></html>").unwrap_err();
        assert!(matches!(err, XhsError::Parse(_)));
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let html = r#"<script>window.__INITIAL_STATE__={"a":</script>"#;
        assert!(matches!(extract_initial_state(html), Err(XhsError::Json(_))));
    }

    #[test]
    fn test_pointer() {
        let value = serde_json::json!({"user": {"notes": [[{"id": "n1"}], []]}});
        assert_eq!(pointer(&value, "user/notes/0/0/id").unwrap(), "n1");
        assert!(pointer(&value, "user/notes/1/0").is_none());
        assert!(pointer(&value, "user/missing").is_none());
    }
}
