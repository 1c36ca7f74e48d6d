//! Error types for repost-sweep
//!
//! This module separates three families of failure:
//! - transport failures (network errors, unexpected HTTP statuses, rate-limit
//!   exhaustion, IP blocks)
//! - application failures (the upstream answered with a non-zero `code`)
//! - local failures (configuration, malformed feed entries, re-entrant runs)
//!
//! Each variant carries enough context to be logged once and surfaced in a
//! [`RunSummary`](crate::types::RunSummary).

use thiserror::Error;

/// Result type alias for repost-sweep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for repost-sweep
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "session.csrf_token")
        key: Option<String>,
    },

    /// The network layer rejected the request or the body could not be read
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status that the retry policy does not handle
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Request URL (without query string)
        url: String,
    },

    /// Upstream signalled an IP-level block; retrying would make it worse
    #[error("requests blocked by upstream (HTTP {status}), change IP or retry later")]
    Blocked {
        /// HTTP status code that triggered the block (412 by default)
        status: u16,
    },

    /// Rate limiting persisted through every allowed attempt
    #[error("too many retries, request failed after {attempts} attempts")]
    RetryExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    /// A read endpoint answered with a non-zero application code
    #[error("API returned code {code}: {message}")]
    Api {
        /// Application-level result code
        code: i64,
        /// Message returned by the upstream
        message: String,
    },

    /// Deleting a feed entry returned a non-zero application code
    #[error("failed to delete entry {entry_id}: code {code} ({message})")]
    DeleteFailed {
        /// Feed entry that could not be deleted
        entry_id: String,
        /// Application-level result code
        code: i64,
        /// Message returned by the upstream
        message: String,
    },

    /// Unfollowing an account returned a non-zero application code
    #[error("failed to unfollow {uid}: code {code} ({message})")]
    UnfollowFailed {
        /// Account that could not be unfollowed
        uid: u64,
        /// Application-level result code
        code: i64,
        /// Message returned by the upstream
        message: String,
    },

    /// A feed entry's nested content could not be decoded
    #[error("classifier error: {0}")]
    Classify(#[from] ClassifyError),

    /// A page claimed more results but gave no way to advance the cursor
    #[error("pagination stalled at offset {offset}")]
    StalledPagination {
        /// Offset that would have been requested again
        offset: String,
    },

    /// A bulk operation is already running on this sweeper
    #[error("a bulk operation is already running")]
    AlreadyRunning,

    /// The configured profile does not belong to the authenticated session
    #[error("profile {profile_uid} is not the signed-in account {session_uid}")]
    NotOwnProfile {
        /// Profile the caller asked to operate on
        profile_uid: u64,
        /// Account identified by the session cookie
        session_uid: u64,
    },

    /// JSON decoding error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to decode the nested content of one feed entry
///
/// These never abort a run; the entry is skipped and treated as not qualifying.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The outer `card` string is not the expected JSON document
    #[error("entry {entry_id}: card is not valid repost JSON: {source}")]
    Card {
        /// Feed entry whose card failed to decode
        entry_id: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The inner `origin_extend_json` string is not valid JSON
    #[error("entry {entry_id}: origin_extend_json is not valid JSON: {source}")]
    OriginExtend {
        /// Feed entry whose metadata failed to decode
        entry_id: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Machine-readable error code, used in events and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Transport(_) => "transport_error",
            Error::HttpStatus { .. } => "http_status",
            Error::Blocked { .. } => "blocked",
            Error::RetryExhausted { .. } => "retry_exhausted",
            Error::Api { .. } => "api_error",
            Error::DeleteFailed { .. } => "delete_failed",
            Error::UnfollowFailed { .. } => "unfollow_failed",
            Error::Classify(_) => "classifier_parse_error",
            Error::StalledPagination { .. } => "stalled_pagination",
            Error::AlreadyRunning => "already_running",
            Error::NotOwnProfile { .. } => "not_own_profile",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// HTTP status carried by this error, if the failure came with one
    ///
    /// The retry policy inspects this to decide between retrying, failing
    /// fatally, or propagating.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Shorthand for a configuration error on a specific key
    pub(crate) fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
