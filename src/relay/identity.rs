//! Crawler identity presented on every upstream fetch.

use axum::http::HeaderValue;

/// Googlebot smartphone user agent.
pub const GOOGLEBOT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0.1; Nexus 5X Build/MMB29P) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.6533.119 Mobile Safari/537.36 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// `User-Agent` value forced onto outbound requests.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_agent: HeaderValue,
}

impl Identity {
    /// The identity used in production.
    pub fn googlebot() -> Self {
        Self {
            user_agent: HeaderValue::from_static(GOOGLEBOT_USER_AGENT),
        }
    }

    /// Header value for the `User-Agent` key.
    pub fn user_agent(&self) -> &HeaderValue {
        &self.user_agent
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::googlebot()
    }
}
