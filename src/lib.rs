//! # repost-sweep
//!
//! Bulk cleanup of a Bilibili profile: delete lottery reposts (or every
//! repost) and unfollow the accounts behind them, or unfollow everyone.
//!
//! ## Design Philosophy
//!
//! repost-sweep is designed to be:
//! - **Polite to the upstream** - One request at a time, a fixed pause after
//!   every processed item, bounded retries on rate limiting
//! - **Safe to stop** - The first failure ends the run; the summary reports
//!   how far it got, and a fresh run simply starts over
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use repost_sweep::{Config, DeleteOptions, SessionConfig, Sweeper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         session: SessionConfig {
//!             cookie: "SESSDATA=...; bili_jct=...; DedeUserID=12345".to_string(),
//!         },
//!         ..Default::default()
//!     };
//!
//!     let sweeper = Sweeper::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = sweeper.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = sweeper
//!         .delete_reposts(DeleteOptions::lottery_and_unfollow(), |p| {
//!             println!("deleted {} / unfollowed {}", p.delete_count, p.unfollow_count);
//!         })
//!         .await?;
//!
//!     if let Some(error) = summary.error() {
//!         eprintln!("stopped early: {error}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Feed entry classification
pub mod classifier;
/// HTTP access to the feed, delete, unfollow and follower endpoints
pub mod client;
/// Configuration types
pub mod config;
/// Bulk-operation engine
pub mod engine;
/// Error types
pub mod error;
/// Retry policy for rate limiting and blocking
pub mod retry;
/// Session credentials taken from the cookie
pub mod session;
/// Core types and events
pub mod types;
/// Feed pagination
pub mod walker;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use client::{DynamicApi, HttpApi};
pub use config::{ApiConfig, Config, RetryConfig, SessionConfig};
pub use engine::Sweeper;
pub use error::{ClassifyError, Error, Result};
pub use session::Session;
pub use types::{
    DeleteOptions, Event, FeedEntry, Page, RunKind, RunOutcome, RunProgress, RunSummary,
    SkippedCard,
};
