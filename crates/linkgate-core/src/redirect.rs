//! Embedded-browser redirect heuristic.
//!
//! Social and video apps open links inside restricted in-app webviews where
//! downloads and subscriptions tend to fail. Given the requesting browser
//! environment, [`plan_navigation`] decides how to hand a destination URL to
//! a real browser: open it directly, go through an Android intent that
//! launches the system browser, or fall back to manual instructions.
//!
//! Both functions here are pure — same inputs, same answer. Whether a
//! navigation attempt actually succeeds is unobservable to the server, which
//! is why the manual path must always stay reachable.

use serde::Serialize;

/// User-agent fragments that identify in-app browsers.
///
/// `wv` is the token Android WebView injects into its UA string; the rest are
/// the major social/video apps' in-app browser identifiers.
const EMBEDDED_MARKERS: &[&str] = &[
    "wv", "webview", "instagram", "fbav", "fban", "youtube", "twitter", "tiktok",
];

/// Android browser package the intent URL asks the OS to resolve.
const INTENT_BROWSER_PACKAGE: &str = "com.android.chrome";

/// Coarse OS classification, independent of embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Other,
}

/// The requesting browser environment, as far as the server can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Environment {
    /// True when the request appears to come from an in-app browser, or the
    /// page is hosted inside another page's frame.
    pub embedded: bool,
    /// OS family from the user-agent.
    pub platform: Platform,
}

/// How to attempt navigation to a destination. Transient — recomputed for
/// every attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationPlan {
    /// Open the destination directly in a new top-level context.
    DirectOpen { url: String },
    /// Navigate to an Android intent URL that launches the system browser,
    /// with the plain destination riding along as the fallback.
    AndroidIntent { url: String, intent_url: String },
    /// Silent escape is not possible; show the destination and let the user
    /// open or copy it manually.
    ManualPrompt { url: String },
}

impl NavigationPlan {
    /// The destination this plan is trying to reach, regardless of variant.
    #[must_use]
    pub fn destination(&self) -> &str {
        match self {
            Self::DirectOpen { url } | Self::AndroidIntent { url, .. } | Self::ManualPrompt { url } => url,
        }
    }
}

/// Classify the requesting environment from the user-agent string and the
/// frame-nesting signal.
///
/// `framed` is true when the page is rendered inside another page's frame
/// (server-side, the `Sec-Fetch-Dest: iframe` header). Platform detection is
/// independent of embedding.
#[must_use]
pub fn classify_environment(user_agent: &str, framed: bool) -> Environment {
    let ua = user_agent.to_lowercase();

    let embedded = framed || EMBEDDED_MARKERS.iter().any(|marker| ua.contains(marker));

    let platform = if ua.contains("android") {
        Platform::Android
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        Platform::Ios
    } else {
        Platform::Other
    };

    Environment { embedded, platform }
}

/// Decide how to attempt navigation to `destination` from `env`.
///
/// Never fails; a plan is produced for every input.
#[must_use]
pub fn plan_navigation(destination: &str, env: &Environment) -> NavigationPlan {
    if env.embedded && env.platform == Platform::Android {
        NavigationPlan::AndroidIntent {
            url: destination.to_owned(),
            intent_url: intent_url(destination),
        }
    } else if !env.embedded {
        NavigationPlan::DirectOpen {
            url: destination.to_owned(),
        }
    } else {
        NavigationPlan::ManualPrompt {
            url: destination.to_owned(),
        }
    }
}

/// Build the Android intent-scheme URL for a destination.
///
/// The structure must stay bit-exact for Android's intent resolver:
/// `intent://open#Intent;scheme=https;package=…;S.browser_fallback_url=…;end`.
/// `S.browser_fallback_url` makes a failed resolution fall back to the plain
/// https URL.
#[must_use]
pub fn intent_url(destination: &str) -> String {
    let fallback = urlencoding::encode(destination);
    format!(
        "intent://open#Intent;scheme=https;package={INTENT_BROWSER_PACKAGE};S.browser_fallback_url={fallback};end"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const ANDROID_WEBVIEW_UA: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7 Build/TQ3A; wv) \
         AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/120.0 Mobile Safari/537.36";
    const IOS_INSTAGRAM_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
         AppleWebKit/605.1.15 (KHTML, like Gecko) Instagram 300.0.0.0";
    const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

    #[test]
    fn android_webview_is_embedded_android() {
        let env = classify_environment(ANDROID_WEBVIEW_UA, false);
        assert!(env.embedded);
        assert_eq!(env.platform, Platform::Android);
    }

    #[test]
    fn ios_instagram_is_embedded_ios() {
        let env = classify_environment(IOS_INSTAGRAM_UA, false);
        assert!(env.embedded);
        assert_eq!(env.platform, Platform::Ios);
    }

    #[test]
    fn desktop_browser_is_not_embedded() {
        let env = classify_environment(DESKTOP_UA, false);
        assert!(!env.embedded);
        assert_eq!(env.platform, Platform::Other);
    }

    #[test]
    fn framing_alone_makes_embedded() {
        let env = classify_environment(DESKTOP_UA, true);
        assert!(env.embedded);
        assert_eq!(env.platform, Platform::Other);
    }

    #[test]
    fn marker_match_is_case_insensitive() {
        let env = classify_environment("Something TikTok/32.0 iPhone", false);
        assert!(env.embedded);
        assert_eq!(env.platform, Platform::Ios);
    }

    #[test]
    fn embedded_android_gets_intent_plan() {
        // Scenario: embedded Android must produce an intent URL carrying the
        // https scheme and the URL-encoded destination as fallback.
        let env = Environment {
            embedded: true,
            platform: Platform::Android,
        };
        let plan = plan_navigation("https://example.com/x.pdf", &env);
        let NavigationPlan::AndroidIntent { url, intent_url } = plan else {
            panic!("expected AndroidIntent, got {plan:?}");
        };
        assert_eq!(url, "https://example.com/x.pdf");
        assert!(intent_url.contains("scheme=https"));
        assert!(intent_url.contains("S.browser_fallback_url=https%3A%2F%2Fexample.com%2Fx.pdf"));
        assert!(intent_url.starts_with("intent://open#Intent;"));
        assert!(intent_url.ends_with(";end"));
    }

    #[test]
    fn normal_browser_gets_direct_open() {
        // Scenario: a non-embedded environment opens the destination as-is.
        let env = Environment {
            embedded: false,
            platform: Platform::Other,
        };
        let plan = plan_navigation("https://example.com/x.pdf", &env);
        assert_eq!(
            plan,
            NavigationPlan::DirectOpen {
                url: "https://example.com/x.pdf".to_owned()
            }
        );
    }

    #[test]
    fn embedded_ios_gets_manual_prompt() {
        // Scenario: embedded iOS cannot escape silently; the destination must
        // be exposed verbatim for display and copy.
        let env = Environment {
            embedded: true,
            platform: Platform::Ios,
        };
        let plan = plan_navigation("https://example.com/x.pdf", &env);
        assert_eq!(
            plan,
            NavigationPlan::ManualPrompt {
                url: "https://example.com/x.pdf".to_owned()
            }
        );
        assert_eq!(plan.destination(), "https://example.com/x.pdf");
    }

    #[test]
    fn planning_is_deterministic() {
        let env = classify_environment(ANDROID_WEBVIEW_UA, false);
        let a = plan_navigation("https://example.com/a", &env);
        let b = plan_navigation("https://example.com/a", &env);
        assert_eq!(a, b);
    }
}
