//! Configuration types for repost-sweep

use crate::error::{Error, Result};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream endpoint configuration
///
/// Defaults point at the production platform. Tests and proxies override the
/// URLs to route traffic through a mock server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Activity feed page endpoint (GET)
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Feed entry deletion endpoint (POST form)
    #[serde(default = "default_delete_url")]
    pub delete_url: String,

    /// Unfollow endpoint (POST form)
    #[serde(default = "default_unfollow_url")]
    pub unfollow_url: String,

    /// Follower list endpoint (GET, no credentials)
    #[serde(default = "default_followers_url")]
    pub followers_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_ms_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            delete_url: default_delete_url(),
            unfollow_url: default_unfollow_url(),
            followers_url: default_followers_url(),
            user_agent: default_user_agent(),
            timeout: default_request_timeout(),
        }
    }
}

/// Authenticated session configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Raw `Cookie` header of a signed-in browser session
    ///
    /// Must contain `DedeUserID` (account id) and `bili_jct` (CSRF token).
    #[serde(default)]
    pub cookie: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("cookie", &"<redacted>")
            .finish()
    }
}

/// Retry policy for rate-limited requests
///
/// The defaults are the platform's fixed policy: up to 5 calls in total,
/// 100ms apart, retrying on HTTP 429 and stopping immediately on HTTP 412.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of calls, including the first one (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay before each retry (default: 100ms)
    #[serde(default = "default_retry_delay", with = "duration_ms_serde")]
    pub delay: Duration,

    /// Statuses that are retried after `delay` (default: [429])
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,

    /// Statuses that abort immediately without retry (default: [412])
    #[serde(default = "default_fatal_statuses")]
    pub fatal_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay: default_retry_delay(),
            retry_statuses: default_retry_statuses(),
            fatal_statuses: default_fatal_statuses(),
        }
    }
}

/// Main configuration for [`Sweeper`](crate::Sweeper)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Upstream endpoints and HTTP client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Signed-in session used for every credentialed request
    #[serde(default)]
    pub session: SessionConfig,

    /// Rate-limit retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pause after each processed item (default: 50ms)
    #[serde(default = "default_item_delay", with = "duration_ms_serde")]
    pub item_delay: Duration,

    /// Profile being operated on; must match the session account when set
    #[serde(default)]
    pub profile_uid: Option<u64>,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            retry: RetryConfig::default(),
            item_delay: default_item_delay(),
            profile_uid: None,
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Check the configuration and derive the session from the cookie
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the offending key when an endpoint URL
    /// is not http(s), the retry policy allows zero attempts, the event channel
    /// has no capacity, or the cookie lacks the account id or CSRF token.
    pub fn validate(&self) -> Result<Session> {
        for (key, value) in [
            ("api.feed_url", &self.api.feed_url),
            ("api.delete_url", &self.api.delete_url),
            ("api.unfollow_url", &self.api.unfollow_url),
            ("api.followers_url", &self.api.followers_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| Error::config(format!("invalid URL {value:?}: {e}"), key))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(
                    format!("unsupported scheme {:?}", parsed.scheme()),
                    key,
                ));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "must allow at least one attempt",
                "retry.max_attempts",
            ));
        }

        if self.event_capacity == 0 {
            return Err(Error::config("must be greater than zero", "event_capacity"));
        }

        Session::from_cookie_header(&self.session.cookie)
    }
}

fn default_feed_url() -> String {
    "https://api.vc.bilibili.com/dynamic_svr/v1/dynamic_svr/space_history".into()
}

fn default_delete_url() -> String {
    "https://api.vc.bilibili.com/dynamic_svr/v1/dynamic_svr/rm_dynamic".into()
}

fn default_unfollow_url() -> String {
    "https://api.live.bilibili.com/relation/v1/Feed/SetUserFollow".into()
}

fn default_followers_url() -> String {
    "https://api.bilibili.com/x/relation/followers".into()
}

fn default_user_agent() -> String {
    concat!("repost-sweep/", env!("CARGO_PKG_VERSION")).into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429]
}

fn default_fatal_statuses() -> Vec<u16> {
    vec![412]
}

fn default_item_delay() -> Duration {
    Duration::from_millis(50)
}

fn default_event_capacity() -> usize {
    256
}

// Durations are written as whole milliseconds
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
