//! Bulk-operation engine
//!
//! The `Sweeper` struct and its operations are organized by concern:
//! - [`delete`] - Repost deletion driven by the pagination walker
//! - [`unfollow`] - Follower-list unfollowing and the shared unfollow step
//!
//! Every run is strictly sequential: one request in flight, a fixed pause
//! after each processed item, and a stop at the first error. At most one run
//! is active per sweeper (clones share the guard).

mod delete;
mod unfollow;


use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;

use crate::client::{DynamicApi, HttpApi};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{Event, RunKind, RunOutcome, RunProgress, RunSummary};
use crate::walker::START_OFFSET;

/// Drives bulk deletions and unfollows for one signed-in account
///
/// Cloneable; all clones share the API client, event channel, and the
/// single-run guard.
#[derive(Clone)]
pub struct Sweeper {
    api: Arc<dyn DynamicApi>,
    session_uid: u64,
    profile_uid: Option<u64>,
    item_delay: Duration,
    running: Arc<AtomicBool>,
    event_tx: broadcast::Sender<Event>,
}

impl Sweeper {
    /// Validate `config` and build a sweeper over HTTP
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an invalid configuration or session cookie.
    pub fn new(config: Config) -> Result<Self> {
        let session = config.validate()?;
        let session_uid = session.uid();
        let api = HttpApi::new(&config, session)?;
        Ok(Self::with_api(&config, session_uid, Arc::new(api)))
    }

    /// Build a sweeper over any [`DynamicApi`] implementation
    ///
    /// Only the engine settings of `config` are used (`item_delay`,
    /// `profile_uid`, `event_capacity`).
    pub fn with_api(config: &Config, session_uid: u64, api: Arc<dyn DynamicApi>) -> Self {
        let (event_tx, _rx) = broadcast::channel(config.event_capacity.max(1));
        Self {
            api,
            session_uid,
            profile_uid: config.profile_uid,
            item_delay: config.item_delay,
            running: Arc::new(AtomicBool::new(false)),
            event_tx,
        }
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Whether a run is in progress on this sweeper or any clone
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Claim the single-run slot and announce the run
    ///
    /// The returned guard owns the run's counters.
    fn begin_run(&self, kind: RunKind) -> Result<RunGuard> {
        if let Some(profile_uid) = self.profile_uid
            && profile_uid != self.session_uid
        {
            tracing::warn!(
                profile_uid,
                session_uid = self.session_uid,
                "refusing to run on another account's profile"
            );
            return Err(Error::NotOwnProfile {
                profile_uid,
                session_uid: self.session_uid,
            });
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(?kind, "bulk operation already running");
            return Err(Error::AlreadyRunning);
        }

        tracing::info!(?kind, "bulk operation started");
        self.emit(Event::RunStarted { kind });

        Ok(RunGuard {
            running: self.running.clone(),
            event_tx: self.event_tx.clone(),
            state: RunState::new(kind),
            finished: false,
        })
    }

    /// Throttle, then hand updated counters to the callback and subscribers
    async fn pace_and_report<P>(&self, state: &RunState, progress: &mut P)
    where
        P: FnMut(&RunProgress) + Send,
    {
        tokio::time::sleep(self.item_delay).await;

        let snapshot = state.progress();
        tracing::info!(
            deleted = snapshot.delete_count,
            unfollowed = snapshot.unfollow_count,
            "progress"
        );
        progress(&snapshot);
        self.emit(Event::Progress {
            kind: snapshot.kind,
            delete_count: snapshot.delete_count,
            unfollow_count: snapshot.unfollow_count,
        });
    }

    /// Log the error that stopped a run and turn it into an outcome
    fn abort(&self, state: &RunState, error: Error) -> RunOutcome {
        if let Error::Blocked { status } = &error {
            self.emit(Event::Blocked { status: *status });
        }

        tracing::error!(
            error = %error,
            code = error.error_code(),
            offset = %state.offset,
            deleted = state.delete_count,
            unfollowed = state.unfollow_count,
            "bulk operation stopped"
        );

        RunOutcome::Aborted { error }
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}

/// Transient state of one run
pub(crate) struct RunState {
    kind: RunKind,
    delete_count: u64,
    unfollow_count: u64,
    unfollowed: HashSet<u64>,
    offset: String,
    started_at: chrono::DateTime<Utc>,
}

impl RunState {
    fn new(kind: RunKind) -> Self {
        Self {
            kind,
            delete_count: 0,
            unfollow_count: 0,
            unfollowed: HashSet::new(),
            offset: START_OFFSET.to_string(),
            started_at: Utc::now(),
        }
    }

    fn progress(&self) -> RunProgress {
        RunProgress {
            kind: self.kind,
            delete_count: self.delete_count,
            unfollow_count: self.unfollow_count,
        }
    }
}

/// Holds the single-run slot and the run's counters
///
/// Releases the slot and reports `RunFinished` on drop. A run future dropped
/// mid-flight still reports the counters reached, flagged as interrupted.
struct RunGuard {
    running: Arc<AtomicBool>,
    event_tx: broadcast::Sender<Event>,
    state: RunState,
    finished: bool,
}

impl RunGuard {
    fn finish(mut self, outcome: RunOutcome) -> RunSummary {
        let summary = RunSummary {
            kind: self.state.kind,
            delete_count: self.state.delete_count,
            unfollow_count: self.state.unfollow_count,
            started_at: self.state.started_at,
            finished_at: Utc::now(),
            outcome,
        };

        let error = summary.error();
        self.send_finished(
            error.map(|e| e.error_code().to_string()),
            error.map(ToString::to_string),
        );
        self.finished = true;
        summary
    }

    fn send_finished(&self, error_code: Option<String>, error: Option<String>) {
        let event = Event::RunFinished {
            kind: self.state.kind,
            delete_count: self.state.delete_count,
            unfollow_count: self.state.unfollow_count,
            error_code,
            error,
        };
        self.event_tx.send(event).ok();
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);

        if !self.finished {
            tracing::warn!(
                kind = ?self.state.kind,
                deleted = self.state.delete_count,
                unfollowed = self.state.unfollow_count,
                "bulk operation interrupted"
            );
            self.send_finished(
                Some("interrupted".into()),
                Some("run ended before completion".into()),
            );
        }

        tracing::info!(kind = ?self.state.kind, "bulk operation finished");
    }
}
