//! Core types for repost-sweep
//!
//! Wire types mirror the upstream JSON payloads; domain types are what the
//! walker, classifier, and engine pass around.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Application-level response envelope: `{ code, message, data }`
///
/// `code == 0` is success. A 2xx response with a non-zero code is an
/// application failure, distinct from transport errors.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OperationResult {
    /// Application result code (0 = success)
    pub code: i64,
    /// Message field used by most endpoints
    #[serde(default)]
    pub message: String,
    /// Message field used by the feed service
    #[serde(default)]
    pub msg: String,
    /// Endpoint-specific payload
    #[serde(default)]
    pub data: Value,
}

impl OperationResult {
    /// Whether the upstream reported success
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Best available human-readable message
    pub fn error_message(&self) -> &str {
        if self.message.is_empty() {
            &self.msg
        } else {
            &self.message
        }
    }

    /// Decode the `data` payload of a successful response
    ///
    /// # Errors
    /// Returns [`Error::Api`] for a non-zero code and [`Error::Serialization`]
    /// when `data` does not match `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            return Err(Error::Api {
                code: self.code,
                message: self.error_message().to_string(),
            });
        }
        Ok(serde_json::from_value(self.data)?)
    }
}

/// One raw activity-feed item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    /// Item metadata
    pub desc: CardDesc,
    /// Item content: a JSON document encoded as a string
    #[serde(default)]
    pub card: String,
}

/// Metadata of a raw activity-feed item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDesc {
    /// Entry id as a string (ids exceed the precision of JSON doubles)
    pub dynamic_id_str: String,
    /// Id of the referenced original entry; 0 when this is not a repost
    #[serde(default, deserialize_with = "lenient_u64")]
    pub orig_dy_id: u64,
}

/// `data` payload of the feed page endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpaceHistory {
    /// Items on this page (absent or null on the last page)
    ///
    /// Kept undecoded; the walker decodes each item on its own so one
    /// malformed item does not cost the whole page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cards: Vec<Value>,
    /// Whether more pages follow; sent as `0`/`1` or a boolean
    #[serde(default, deserialize_with = "truthy_flag")]
    pub has_more: bool,
    /// Server-suggested offset for the next page
    #[serde(default, deserialize_with = "optional_cursor")]
    pub next_offset: Option<String>,
}

/// `data` payload of the follower list endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FollowerList {
    /// Followers, most recent first
    #[serde(default, deserialize_with = "null_as_empty")]
    pub list: Vec<Follower>,
}

/// One follower entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Follower {
    /// Account id
    pub mid: u64,
    /// Display name
    #[serde(default)]
    pub uname: String,
}

/// A feed item whose metadata could not be decoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedCard {
    /// Item id when it could be read, otherwise empty
    pub entry_id: String,
    /// Decode error message
    pub reason: String,
}

/// One page produced by the pagination walker
#[derive(Clone, Debug)]
pub struct Page {
    /// Decoded entries, in feed order
    pub entries: Vec<Card>,
    /// Items dropped because their metadata was malformed
    pub skipped: Vec<SkippedCard>,
    /// Whether the server reported further pages
    pub has_more: bool,
    /// Offset the walker will request next (None on the last page)
    pub next_cursor: Option<String>,
}

/// A classified repost entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry id; used for deletion and as the pagination cursor
    pub entry_id: String,
    /// Always true for classified entries; non-reposts are never materialized
    pub is_repost: bool,
    /// Author of the original entry, when the card names one
    pub origin_author_id: Option<u64>,
    /// Vendor-supplied lottery marker on the original entry
    pub is_lottery_flagged: bool,
}

/// Filters for [`Sweeper::delete_reposts`](crate::Sweeper::delete_reposts)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    /// Only delete reposts whose original entry is lottery-flagged
    pub lottery_only: bool,
    /// Also unfollow the author of each deleted repost
    pub also_unfollow: bool,
}

impl DeleteOptions {
    /// Delete lottery reposts, keep follows
    pub fn lottery() -> Self {
        Self {
            lottery_only: true,
            also_unfollow: false,
        }
    }

    /// Delete lottery reposts and unfollow their authors
    pub fn lottery_and_unfollow() -> Self {
        Self {
            lottery_only: true,
            also_unfollow: true,
        }
    }

    /// Delete every repost, keep follows
    pub fn all_reposts() -> Self {
        Self {
            lottery_only: false,
            also_unfollow: false,
        }
    }

    /// Delete every repost and unfollow their authors
    pub fn all_reposts_and_unfollow() -> Self {
        Self {
            lottery_only: false,
            also_unfollow: true,
        }
    }
}

/// Which bulk operation a run performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RunKind {
    /// Delete reposts, optionally unfollowing their authors
    DeleteReposts {
        /// Filters used for the run
        options: DeleteOptions,
    },
    /// Unfollow every account in the follower list
    UnfollowAll,
}

/// Counters handed to the progress callback after each processed item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunProgress {
    /// Operation being run
    pub kind: RunKind,
    /// Entries deleted so far
    pub delete_count: u64,
    /// Accounts unfollowed so far
    pub unfollow_count: u64,
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The feed or follower list was exhausted
    Completed,
    /// The run stopped at the first error; counters reflect work done before it
    Aborted {
        /// Error that stopped the run
        error: Error,
    },
}

/// Final report of one bulk operation
#[derive(Debug)]
pub struct RunSummary {
    /// Operation that was run
    pub kind: RunKind,
    /// Entries deleted
    pub delete_count: u64,
    /// Accounts unfollowed
    pub unfollow_count: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run ended
    pub finished_at: DateTime<Utc>,
    /// How the run ended
    pub outcome: RunOutcome,
}

impl RunSummary {
    /// Whether the run finished without error
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    /// Error that stopped the run, if any
    pub fn error(&self) -> Option<&Error> {
        match &self.outcome {
            RunOutcome::Completed => None,
            RunOutcome::Aborted { error } => Some(error),
        }
    }
}

/// Event emitted during a bulk operation
///
/// `RunStarted` and `RunFinished` bracket every run; consumers disable their
/// controls on the first and re-enable them on the second.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run has started
    RunStarted {
        /// Operation being run
        kind: RunKind,
    },

    /// Counters changed
    Progress {
        /// Operation being run
        kind: RunKind,
        /// Entries deleted so far
        delete_count: u64,
        /// Accounts unfollowed so far
        unfollow_count: u64,
    },

    /// A feed item could not be decoded or classified and was skipped
    EntrySkipped {
        /// Skipped entry (empty when the item carried no readable id)
        entry_id: String,
        /// Decode or classifier error message
        reason: String,
    },

    /// Upstream blocked further requests; the user must change IP or wait
    Blocked {
        /// HTTP status that signalled the block
        status: u16,
    },

    /// A run has ended, successfully or not
    RunFinished {
        /// Operation that was run
        kind: RunKind,
        /// Entries deleted
        delete_count: u64,
        /// Accounts unfollowed
        unfollow_count: u64,
        /// Machine-readable code of the error that stopped the run
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
        /// Message of the error that stopped the run
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// JavaScript truthiness of a vendor JSON value
///
/// The upstream uses flags loosely: `1`, `true`, a non-empty string, or a
/// whole object all mean "set".
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_cursor<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("expected unsigned id, got {n}"))),
        Some(Value::String(s)) if s.is_empty() => Ok(0),
        Some(Value::String(s)) => s.parse().map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("expected id, got {other}"))),
    }
}
