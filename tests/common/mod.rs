//! Common test utilities for repost-sweep end-to-end tests

#![allow(dead_code)]

use repost_sweep::{ApiConfig, Config, Event, RetryConfig, SessionConfig};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::MockServer;

/// Signed-in account used by every scenario
pub const SESSION_UID: u64 = 1001;
pub const COOKIE: &str = "SESSDATA=sess; bili_jct=csrf-tok; DedeUserID=1001";

/// Config routing every endpoint to `server`, with millisecond pacing
pub fn mock_config(server: &MockServer) -> Config {
    let base = server.uri();
    Config {
        api: ApiConfig {
            feed_url: format!("{base}/x/dynamic/space_history"),
            delete_url: format!("{base}/x/dynamic/rm_dynamic"),
            unfollow_url: format!("{base}/x/relation/modify"),
            followers_url: format!("{base}/x/relation/followers"),
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
        session: SessionConfig {
            cookie: COOKIE.to_string(),
        },
        retry: RetryConfig {
            delay: Duration::from_millis(5),
            ..Default::default()
        },
        item_delay: Duration::from_millis(1),
        ..Default::default()
    }
}

/// Wire form of a repost card; `card` is itself a JSON string
pub fn repost_card(id: &str, author: u64, lott: Value) -> Value {
    let extend = json!({ "lott": lott }).to_string();
    let card = json!({
        "item": { "content": "//repost" },
        "origin_extend_json": extend,
        "origin_user": { "info": { "uid": author, "uname": format!("up{author}") } }
    });
    json!({
        "desc": { "dynamic_id_str": id, "orig_dy_id": 7_000_000 + author },
        "card": card.to_string()
    })
}

/// Wire form of an original entry
pub fn original_card(id: &str) -> Value {
    json!({
        "desc": { "dynamic_id_str": id, "orig_dy_id": 0 },
        "card": json!({ "item": { "description": "hello" } }).to_string()
    })
}

/// Feed envelope; `has_more` is sent as an integer like the live endpoint
pub fn feed_page(cards: Vec<Value>, has_more: bool) -> Value {
    json!({
        "code": 0,
        "msg": "",
        "message": "",
        "data": { "has_more": i32::from(has_more), "cards": cards }
    })
}

/// Envelope of a successful write
pub fn ok_envelope() -> Value {
    json!({ "code": 0, "msg": "", "message": "", "data": {} })
}

/// Every event currently buffered on `rx`
pub fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
