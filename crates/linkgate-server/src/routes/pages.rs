//! Public pages: the locked landing page and the token-gated page.
//!
//! The gated page decodes the share token from its path. A token that fails
//! to decode is never a hard error — the page falls back to the stored
//! default configuration (or the built-in default) and shows an
//! "invalid link" notice, so the page always stays interactive.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use linkgate_core::codec;
use linkgate_core::config::ConfigRecord;

use super::html_escape;
use crate::state::AppState;

/// Build the public pages router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_page))
        .route("/c/{token}", get(gated_page))
}

// ── Rendering helpers ────────────────────────────────────────────────

/// Encode a destination URL for the `/r?u=` launcher: base64, then
/// percent-encoded so it survives being a query value.
fn encode_for_redirect(url: &str) -> String {
    urlencoding::encode(&BASE64.encode(url)).into_owned()
}

/// Shared stylesheet for the public pages.
const PAGE_CSS: &str = r"<style>
  body { margin: 0; font-family: system-ui, sans-serif; background: #f6fbff; color: #222; }
  .hero { background: #205781; color: white; padding: 2.5rem 1rem; text-align: center; }
  .hero h1 { margin: 0 0 .5rem 0; }
  .card { max-width: 680px; margin: 2rem auto; padding: 1.5rem 2rem; background: white;
          border-radius: 12px; box-shadow: 0 8px 30px rgba(0,0,0,0.08); }
  .actions { display: flex; gap: 12px; justify-content: center; flex-wrap: wrap; margin: 1.5rem 0; }
  .btn { display: inline-block; padding: 12px 20px; border-radius: 10px; font-size: 16px;
         text-decoration: none; border: none; cursor: pointer; }
  .btn-subscribe { background: #c00; color: white; }
  .btn-download { background: #205781; color: white; }
  .btn[aria-disabled='true'] { background: #bbb; cursor: not-allowed; }
  .notice { background: #fff3cd; border: 1px solid #ffe08a; border-radius: 8px;
            padding: .8rem 1rem; margin-bottom: 1rem; }
  ol { line-height: 1.6; }
</style>";

/// Locked landing page shown without an access token.
const LANDING_BODY: &str = r#"<div class="hero">
  <h1>Subscribe &amp; Unlock</h1>
  <p>Access exclusive content through generated links</p>
</div>
<div class="card">
  <h2>&#128274; Access Required</h2>
  <p>This page requires a valid access link. To get one:</p>
  <ol>
    <li>Contact the administrator for a valid access link.</li>
    <li>Open the link to reach the subscription page.</li>
    <li>Follow the instructions there to unlock your download.</li>
  </ol>
  <div class="actions">
    <span class="btn btn-subscribe" aria-disabled="true">Subscribe to Channel</span>
    <span class="btn btn-download" aria-disabled="true">Download</span>
  </div>
  <p><strong>Note:</strong> each access link is unique and unlocks specific content.</p>
</div>"#;

/// Token-gated page template. Placeholders are substituted at render time
/// with pre-escaped values.
const GATED_BODY: &str = r#"<div class="hero">
  <h1>{{CHANNEL_NAME}}</h1>
  <p>Subscribe to get exclusive content and resources</p>
</div>
<div class="card">
  {{NOTICE}}
  <h2>&#128218; Get Your Free Resource</h2>
  <p>Subscribe to {{CHANNEL_NAME}} and download the exclusive material.</p>
  <div class="actions">
    <a class="btn btn-subscribe" href="/r?u={{SUBSCRIBE_PARAM}}" target="_blank" rel="noopener noreferrer">Subscribe to Channel</a>
    <a class="btn btn-download" href="/r?u={{DOWNLOAD_PARAM}}" target="_blank" rel="noopener noreferrer">Download</a>
  </div>
  <p><strong>How it works:</strong></p>
  <ol>
    <li>Click "Subscribe to Channel" &mdash; the launcher opens the channel in your real browser.</li>
    <li>Subscribe and come back to this tab.</li>
    <li>Click "Download" to open the resource the same way.</li>
  </ol>
</div>"#;

/// Wrap a body in the page shell.
fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title>{PAGE_CSS}</head><body>{body}</body></html>",
        html_escape(title)
    ))
}

// ── Handlers ─────────────────────────────────────────────────────────

/// The locked landing page at `/`.
async fn landing_page() -> Html<String> {
    page("Subscribe & Unlock", LANDING_BODY)
}

/// The token-gated page at `/c/{token}`.
async fn gated_page(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Html<String> {
    let (record, notice) = match codec::decode(&token) {
        Ok(record) => (record, None),
        Err(err) => {
            warn!(error = %err, "share token failed to decode, serving fallback");
            let fallback = state
                .settings
                .load()
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            (
                fallback,
                Some("Invalid or corrupted link. Please check the URL."),
            )
        }
    };

    Html(render_gated(&record, notice))
}

/// Render the gated page body for a configuration record.
fn render_gated(record: &ConfigRecord, notice: Option<&str>) -> String {
    let notice_html = notice.map_or(String::new(), |text| {
        format!("<div class=\"notice\">{}</div>", html_escape(text))
    });

    let body = GATED_BODY
        .replace("{{CHANNEL_NAME}}", &html_escape(&record.channel_name))
        .replace("{{SUBSCRIBE_PARAM}}", &encode_for_redirect(&record.subscribe_url))
        .replace("{{DOWNLOAD_PARAM}}", &encode_for_redirect(&record.download_url))
        .replace("{{NOTICE}}", &notice_html);

    let Html(html) = page(&record.channel_name, &body);
    html
}
