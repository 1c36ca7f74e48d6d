//! Shared test helpers: an in-memory [`DynamicApi`] and feed card builders.

use crate::client::DynamicApi;
use crate::error::{Error, Result};
use crate::types::{Card, CardDesc, Follower, FollowerList, OperationResult, SpaceHistory};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One upstream call recorded by [`FakeApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Feed { offset: String },
    Delete { entry_id: String },
    Unfollow { uid: u64 },
    Followers { owner: u64 },
}

/// Scripted upstream: feed pages are served in order, writes succeed unless
/// a code or error was registered for that id.
#[derive(Default)]
pub(crate) struct FakeApi {
    pages: Mutex<VecDeque<Result<SpaceHistory>>>,
    delete_codes: Mutex<HashMap<String, i64>>,
    delete_errors: Mutex<HashMap<String, Error>>,
    unfollow_codes: Mutex<HashMap<u64, i64>>,
    followers: Mutex<Vec<Follower>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(self, page: SpaceHistory) -> Self {
        self.pages.lock().unwrap().push_back(Ok(page));
        self
    }

    pub(crate) fn with_feed_error(self, error: Error) -> Self {
        self.pages.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn with_delete_code(self, entry_id: &str, code: i64) -> Self {
        self.delete_codes
            .lock()
            .unwrap()
            .insert(entry_id.to_string(), code);
        self
    }

    pub(crate) fn with_delete_error(self, entry_id: &str, error: Error) -> Self {
        self.delete_errors
            .lock()
            .unwrap()
            .insert(entry_id.to_string(), error);
        self
    }

    pub(crate) fn with_unfollow_code(self, uid: u64, code: i64) -> Self {
        self.unfollow_codes.lock().unwrap().insert(uid, code);
        self
    }

    pub(crate) fn with_followers(self, ids: &[u64]) -> Self {
        *self.followers.lock().unwrap() = ids
            .iter()
            .map(|&mid| Follower {
                mid,
                uname: format!("user{mid}"),
            })
            .collect();
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn feed_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Feed { offset } => Some(offset),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { entry_id } => Some(entry_id),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn unfollowed(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Unfollow { uid } => Some(uid),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn result_with_code(code: i64) -> OperationResult {
    OperationResult {
        code,
        message: if code == 0 { String::new() } else { "rejected".into() },
        ..Default::default()
    }
}

#[async_trait]
impl DynamicApi for FakeApi {
    async fn space_history(&self, _host_uid: u64, offset: &str) -> Result<SpaceHistory> {
        self.record(Call::Feed {
            offset: offset.to_string(),
        });
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(Error::Api {
                code: -1,
                message: "no scripted page left".into(),
            })
        })
    }

    async fn remove_dynamic(&self, entry_id: &str) -> Result<OperationResult> {
        self.record(Call::Delete {
            entry_id: entry_id.to_string(),
        });
        if let Some(error) = self.delete_errors.lock().unwrap().remove(entry_id) {
            return Err(error);
        }
        let code = self
            .delete_codes
            .lock()
            .unwrap()
            .get(entry_id)
            .copied()
            .unwrap_or(0);
        Ok(result_with_code(code))
    }

    async fn unfollow_user(&self, target_uid: u64) -> Result<OperationResult> {
        self.record(Call::Unfollow { uid: target_uid });
        let code = self
            .unfollow_codes
            .lock()
            .unwrap()
            .get(&target_uid)
            .copied()
            .unwrap_or(0);
        Ok(result_with_code(code))
    }

    async fn followers(&self, owner_uid: u64) -> Result<FollowerList> {
        self.record(Call::Followers { owner: owner_uid });
        Ok(FollowerList {
            list: self.followers.lock().unwrap().clone(),
        })
    }
}

/// A repost of an entry by `author` with the given vendor lottery value
pub(crate) fn repost_card(id: &str, author: u64, lott: Value) -> Card {
    let extend = json!({ "lott": lott }).to_string();
    let content = json!({
        "item": { "content": "repost" },
        "origin_extend_json": extend,
        "origin_user": { "info": { "uid": author, "uname": format!("author{author}") } }
    });
    Card {
        desc: CardDesc {
            dynamic_id_str: id.to_string(),
            orig_dy_id: 9_000_000 + author,
        },
        card: content.to_string(),
    }
}

/// An original (non-repost) entry
pub(crate) fn original_card(id: &str) -> Card {
    Card {
        desc: CardDesc {
            dynamic_id_str: id.to_string(),
            orig_dy_id: 0,
        },
        card: json!({ "item": { "description": "hello" } }).to_string(),
    }
}

/// A repost whose nested content is not valid JSON
pub(crate) fn broken_repost_card(id: &str) -> Card {
    Card {
        desc: CardDesc {
            dynamic_id_str: id.to_string(),
            orig_dy_id: 1,
        },
        card: "{truncated".into(),
    }
}

pub(crate) fn history(cards: Vec<Card>, has_more: bool) -> SpaceHistory {
    SpaceHistory {
        cards: cards
            .into_iter()
            .map(|card| serde_json::to_value(card).unwrap())
            .collect(),
        has_more,
        next_offset: None,
    }
}
