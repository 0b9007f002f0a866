//! The redirect launcher at `/r?u=<encoded-destination>`.
//!
//! Decodes the destination from the `u` parameter (base64 or plain),
//! classifies the requesting browser from its headers, and executes the
//! navigation plan:
//!
//! - `DirectOpen` — plain HTTP redirect to the destination.
//! - `AndroidIntent` — a page that auto-navigates to the intent URL, with a
//!   manual fallback UI beneath (some in-app browsers honor a user-tapped
//!   intent link even when automatic redirects are blocked).
//! - `ManualPrompt` — a page offering a retry link, the raw URL as
//!   selectable text, and a copy affordance.
//!
//! Whether a hand-off actually succeeded is unobservable, so the manual UI
//! ships on every rendered page.

use std::sync::Arc;

use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD as BASE64, STANDARD_NO_PAD as BASE64_NO_PAD};
use serde::Deserialize;
use tracing::debug;

use linkgate_core::redirect::{self, NavigationPlan};

use super::html_escape;
use crate::state::AppState;

/// Build the launcher router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/r", get(launch))
}

/// Query parameters of the launcher.
#[derive(Debug, Deserialize)]
struct LaunchParams {
    /// Base64-or-plain destination URL.
    u: Option<String>,
}

/// Recover the destination URL from the `u` parameter.
///
/// The issuing side sends `base64(url)`; links assembled by hand may carry
/// the URL in plain text. Only `http`/`https` destinations are forwarded —
/// anything else (including a `javascript:` smuggled through base64) is
/// rejected.
fn resolve_destination(raw: &str) -> Option<String> {
    let candidate = BASE64
        .decode(raw)
        .or_else(|_| BASE64_NO_PAD.decode(raw))
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_owned());

    if candidate.starts_with("https://") || candidate.starts_with("http://") {
        Some(candidate)
    } else {
        None
    }
}

/// Detect whether the request is being rendered inside another page's frame.
fn is_framed(headers: &HeaderMap) -> bool {
    headers
        .get("sec-fetch-dest")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|dest| matches!(dest, "iframe" | "frame" | "embed" | "object"))
}

/// The launcher handler.
async fn launch(Query(params): Query<LaunchParams>, headers: HeaderMap) -> Response {
    let Some(destination) = params.u.as_deref().and_then(resolve_destination) else {
        return (StatusCode::BAD_REQUEST, page(MISSING_BODY.to_owned())).into_response();
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let env = redirect::classify_environment(user_agent, is_framed(&headers));
    let plan = redirect::plan_navigation(&destination, &env);

    debug!(?env, plan = plan_name(&plan), "navigation planned");

    match plan {
        NavigationPlan::DirectOpen { url } => Redirect::to(&url).into_response(),
        NavigationPlan::AndroidIntent { url, intent_url } => {
            page(render_intent(&url, &intent_url)).into_response()
        }
        NavigationPlan::ManualPrompt { url } => page(render_manual(&url)).into_response(),
    }
}

fn plan_name(plan: &NavigationPlan) -> &'static str {
    match plan {
        NavigationPlan::DirectOpen { .. } => "direct_open",
        NavigationPlan::AndroidIntent { .. } => "android_intent",
        NavigationPlan::ManualPrompt { .. } => "manual_prompt",
    }
}

// ── Rendering ────────────────────────────────────────────────────────

const LAUNCH_CSS: &str = r"<style>
  body { margin: 0; font-family: system-ui, sans-serif; background: #f6fbff;
         display: flex; align-items: center; justify-content: center; min-height: 100vh; }
  .card { max-width: 720px; width: 100%; margin: 1rem; padding: 24px; border-radius: 12px;
          background: white; box-shadow: 0 8px 30px rgba(0,0,0,0.08); text-align: center; }
  .actions { display: flex; gap: 10px; justify-content: center; flex-wrap: wrap; margin: 16px 0; }
  .btn { display: inline-block; padding: 12px 18px; border-radius: 10px; font-size: 16px;
         text-decoration: none; cursor: pointer; }
  .btn-primary { background: #205781; color: white; border: none; }
  .btn-outline { border: 1px solid #ddd; color: #205781; background: white; }
  .url-box { background: #fafafa; padding: 10px; border-radius: 6px; word-break: break-all;
             font-family: monospace; font-size: 12px; margin-top: 8px; }
  .hint { color: #666; font-size: 13px; margin-top: 12px; }
</style>";

const MISSING_BODY: &str = "<div class=\"card\"><h2>Invalid or missing destination</h2>\
  <p>No destination URL provided. Make sure the <code>u</code> query parameter is present.</p></div>";

fn page(body: String) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>Open in Browser</title>{LAUNCH_CSS}</head><body>{body}</body></html>"
    ))
}

/// Manual fallback block shared by the intent and manual pages.
fn manual_block(url: &str) -> String {
    let href = html_escape(url);
    format!(
        "<div class=\"actions\">\
           <a class=\"btn btn-primary\" href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">Open in Browser</a>\
         </div>\
         <p class=\"hint\">Or copy this URL and open it in Chrome / Safari:</p>\
         <div class=\"url-box\" id=\"dest\">{href}</div>\
         <div class=\"actions\">\
           <button class=\"btn btn-outline\" \
             onclick=\"navigator.clipboard&amp;&amp;navigator.clipboard.writeText(document.getElementById('dest').textContent)\">\
             Copy URL</button>\
         </div>"
    )
}

/// Page for the Android intent path: auto-navigate, manual UI beneath.
fn render_intent(url: &str, intent_url: &str) -> String {
    let intent_href = html_escape(intent_url);
    format!(
        "<div class=\"card\">\
           <meta http-equiv=\"refresh\" content=\"0;url={intent_href}\">\
           <h2>Opening in your browser&hellip;</h2>\
           <p>This link opened inside an app. If nothing happens, tap the intent link below.</p>\
           <div class=\"actions\">\
             <a class=\"btn btn-outline\" href=\"{intent_href}\">Open (Android intent)</a>\
           </div>{}\
         </div>",
        manual_block(url)
    )
}

/// Page for the manual path (embedded, non-Android).
fn render_manual(url: &str) -> String {
    format!(
        "<div class=\"card\">\
           <h2>Open in Browser</h2>\
           <p>This link opened inside an app. Use one of the options below to open the \
              destination in your browser.</p>{}\
         </div>",
        manual_block(url)
    )
}
