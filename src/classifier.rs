//! Repost classification
//!
//! A feed card's `card` field is a JSON document stored as a string, and a
//! repost's `origin_extend_json` is another JSON document stored as a string
//! inside it. Both levels are decoded into typed structures here. The
//! lottery flag is whatever the vendor put in `lott`; it is not computed.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ClassifyError;
use crate::types::{Card, FeedEntry, is_truthy};

/// Stage one: the repost card
#[derive(Debug, Deserialize)]
struct RepostContent {
    origin_extend_json: String,
    #[serde(default)]
    origin_user: Option<OriginUser>,
}

#[derive(Debug, Deserialize)]
struct OriginUser {
    info: OriginUserInfo,
}

#[derive(Debug, Deserialize)]
struct OriginUserInfo {
    uid: u64,
}

/// Stage two: vendor metadata of the original entry
#[derive(Debug, Deserialize)]
struct OriginExtend {
    #[serde(default)]
    lott: Value,
}

/// Classify one feed card
///
/// Returns `Ok(None)` for entries that are not reposts (`orig_dy_id == 0`).
///
/// # Errors
/// Returns a [`ClassifyError`] when either nested document fails to decode.
/// Callers treat that as "does not qualify" and move on.
pub fn classify(card: &Card) -> Result<Option<FeedEntry>, ClassifyError> {
    if card.desc.orig_dy_id == 0 {
        return Ok(None);
    }

    let entry_id = &card.desc.dynamic_id_str;

    let content: RepostContent =
        serde_json::from_str(&card.card).map_err(|source| ClassifyError::Card {
            entry_id: entry_id.clone(),
            source,
        })?;

    let extend: OriginExtend = serde_json::from_str(&content.origin_extend_json).map_err(
        |source| ClassifyError::OriginExtend {
            entry_id: entry_id.clone(),
            source,
        },
    )?;

    Ok(Some(FeedEntry {
        entry_id: entry_id.clone(),
        is_repost: true,
        origin_author_id: content.origin_user.map(|u| u.info.uid),
        is_lottery_flagged: is_truthy(&extend.lott),
    }))
}
