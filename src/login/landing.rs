use html_escape::{encode_double_quoted_attribute, encode_script_single_quoted_text};

/// How often the landing page polls the status endpoint
pub const STATUS_POLL_INTERVAL_MS: u64 = 2000;

/// Render the self-contained login page for `session_id`.
///
/// The page shows `/login/{id}/qrcode`, polls `/login/{id}/status` every
/// [`STATUS_POLL_INTERVAL_MS`] and stops polling once the status is
/// `success`, `expired`, `failed` or `missing`.
pub fn render_landing_page(session_id: &str, mount: &str) -> String {
    let base = format!("{}/{}", mount.trim_end_matches('/'), session_id);
    let attr_base = encode_double_quoted_attribute(&base);
    let js_base = encode_script_single_quoted_text(&base);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Scan to log in</title>
<style>
  body {{ font-family: -apple-system, "Segoe UI", sans-serif; display: flex; flex-direction: column; align-items: center; margin-top: 48px; color: #333; }}
  #qrcode {{ width: 280px; min-height: 280px; border: 1px solid #eee; border-radius: 8px; }}
  #status {{ margin-top: 16px; font-size: 15px; }}
  #cookie {{ margin-top: 12px; width: 90%; max-width: 640px; height: 96px; display: none; }}
  button {{ margin-top: 12px; padding: 6px 16px; }}
</style>
</head>
<body>
<h2>Scan the QR code with the mobile app</h2>
<img id="qrcode" alt="QR code" src="{attr_base}/qrcode">
<div id="status">Waiting for scan…</div>
<button id="refresh" type="button">Refresh QR code</button>
<textarea id="cookie" readonly></textarea>
<script>
(() => {{
  const base = '{js_base}';
  const pollInterval = {poll};
  const qrcode = document.getElementById('qrcode');
  const statusLine = document.getElementById('status');
  const cookieBox = document.getElementById('cookie');
  const messages = {{
    pending: 'Waiting for scan…',
    success: 'Logged in. The cookie below is now used by the feed routes.',
    expired: 'The QR code expired. Reload the page to start over.',
    failed: 'Login failed',
    missing: 'This login session no longer exists. Reload the page to start over.'
  }};
  let timer = null;

  const reloadQrcode = () => {{
    qrcode.src = base + '/qrcode?t=' + Date.now();
  }};

  const poll = async () => {{
    let body;
    try {{
      const response = await fetch(base + '/status', {{ cache: 'no-store' }});
      body = await response.json();
    }} catch (e) {{
      return;
    }}
    const status = body.status || 'missing';
    statusLine.textContent = messages[status] || status;
    if (status === 'failed' && body.error) {{
      statusLine.textContent += ': ' + body.error;
    }}
    if (status === 'success' && body.cookie) {{
      cookieBox.value = body.cookie;
      cookieBox.style.display = 'block';
    }}
    if (status !== 'pending') {{
      clearInterval(timer);
      document.getElementById('refresh').disabled = true;
    }}
  }};

  document.getElementById('refresh').addEventListener('click', reloadQrcode);
  timer = setInterval(poll, pollInterval);
}})();
</script>
</body>
</html>
"#,
        attr_base = attr_base,
        js_base = js_base,
        poll = STATUS_POLL_INTERVAL_MS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_references_session_endpoints() {
        let html = render_landing_page("abc-123", "/login");
        assert!(html.contains(r#"src="/login/abc-123/qrcode""#));
        assert!(html.contains("const base = '/login/abc-123';"));
        assert!(html.contains("base + '/status'"));
        assert!(html.contains("const pollInterval = 2000;"));
    }

    #[test]
    fn test_status_vocabulary() {
        let html = render_landing_page("abc", "/login");
        for status in ["pending", "success", "expired", "failed", "missing"] {
            assert!(html.contains(&format!("{}:", status)), "missing {}", status);
        }
    }

    #[test]
    fn test_mount_trailing_slash() {
        let html = render_landing_page("abc", "/login/");
        assert!(html.contains("const base = '/login/abc';"));
    }

    #[test]
    fn test_session_id_is_escaped() {
        let html = render_landing_page("a\"b'<c>", "/login");
        assert!(!html.contains("a\"b'<c>"));
    }
}
