//! Cursor-driven pagination over the activity feed
//!
//! Each page is fetched with the id of the last entry of the previous page as
//! its offset. The walk ends after a page that reports no further pages. It is
//! not resumable: starting again means starting from offset `"0"`, which is
//! harmless because deleted entries no longer appear.

use futures::Stream;
use serde_json::Value;

use crate::client::DynamicApi;
use crate::error::{Error, Result};
use crate::types::{Card, Page, SkippedCard, SpaceHistory};

/// Offset that requests the newest page
pub const START_OFFSET: &str = "0";

/// Lazily walk `host_uid`'s feed from `start_offset`
///
/// The stream yields one [`Page`] per fetch and ends without a further fetch
/// once a page has `has_more == false`. A page that claims more results but
/// offers no new cursor yields [`Error::StalledPagination`].
pub fn walk<'a>(
    api: &'a dyn DynamicApi,
    host_uid: u64,
    start_offset: impl Into<String>,
) -> impl Stream<Item = Result<Page>> + Send + 'a {
    futures::stream::try_unfold(Some(start_offset.into()), move |offset| async move {
        let Some(offset) = offset else {
            return Ok(None);
        };

        let history = api.space_history(host_uid, &offset).await?;
        let page = next_page(&offset, history)?;
        tracing::debug!(
            offset = %offset,
            entries = page.entries.len(),
            skipped = page.skipped.len(),
            has_more = page.has_more,
            "fetched feed page"
        );

        let next = page.next_cursor.clone();
        Ok::<_, Error>(Some((page, next)))
    })
}

/// Turn a fetched feed payload into a [`Page`] and pick the next cursor
fn next_page(offset: &str, history: SpaceHistory) -> Result<Page> {
    let SpaceHistory {
        cards,
        has_more,
        next_offset,
    } = history;

    // The cursor follows the raw feed order, malformed items included
    let last_raw_id = cards.last().and_then(raw_entry_id);
    let (entries, skipped) = decode_cards(cards);

    if !has_more {
        return Ok(Page {
            entries,
            skipped,
            has_more: false,
            next_cursor: None,
        });
    }

    // An empty page can only advance through the server-suggested offset
    let cursor = last_raw_id
        .or_else(|| entries.last().map(|card| card.desc.dynamic_id_str.clone()))
        .or(next_offset);

    match cursor {
        Some(cursor) if is_valid_cursor(&cursor) && cursor != offset => Ok(Page {
            entries,
            skipped,
            has_more: true,
            next_cursor: Some(cursor),
        }),
        _ => Err(Error::StalledPagination {
            offset: offset.to_string(),
        }),
    }
}

/// Decode each item on its own; malformed items are set aside
fn decode_cards(cards: Vec<Value>) -> (Vec<Card>, Vec<SkippedCard>) {
    let mut entries = Vec::with_capacity(cards.len());
    let mut skipped = Vec::new();

    for raw in cards {
        let entry_id = raw_entry_id(&raw).unwrap_or_default();
        match serde_json::from_value::<Card>(raw) {
            Ok(card) if !card.desc.dynamic_id_str.is_empty() => entries.push(card),
            Ok(_) => skipped.push(SkippedCard {
                entry_id,
                reason: "item has an empty id".to_string(),
            }),
            Err(e) => skipped.push(SkippedCard {
                entry_id,
                reason: format!("malformed item metadata: {e}"),
            }),
        }
    }

    (entries, skipped)
}

/// Item id read straight from the raw JSON, if present
fn raw_entry_id(raw: &Value) -> Option<String> {
    match &raw["desc"]["dynamic_id_str"] {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn is_valid_cursor(cursor: &str) -> bool {
    !cursor.is_empty() && cursor != START_OFFSET
}
