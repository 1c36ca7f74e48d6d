//! Unfollowing

use super::{RunState, Sweeper};
use crate::error::{Error, Result};
use crate::types::{RunKind, RunOutcome, RunProgress, RunSummary};

impl Sweeper {
    /// Unfollow every account in the signed-in user's follower list
    ///
    /// The list is fetched once; accounts are then unfollowed one at a time
    /// with the same pacing and stop-on-first-error policy as
    /// [`delete_reposts`](Sweeper::delete_reposts).
    ///
    /// # Errors
    /// Only rejections before the run starts: [`Error::AlreadyRunning`] and
    /// [`Error::NotOwnProfile`].
    pub async fn unfollow_all<P>(&self, mut progress: P) -> Result<RunSummary>
    where
        P: FnMut(&RunProgress) + Send,
    {
        let kind = RunKind::UnfollowAll;
        let mut guard = self.begin_run(kind)?;

        let outcome = match self.sweep_followers(&mut guard.state, &mut progress).await {
            Ok(()) => RunOutcome::Completed,
            Err(error) => self.abort(&guard.state, error),
        };

        Ok(guard.finish(outcome))
    }

    async fn sweep_followers<P>(&self, state: &mut RunState, progress: &mut P) -> Result<()>
    where
        P: FnMut(&RunProgress) + Send,
    {
        let followers = self.api.followers(self.session_uid).await?;
        tracing::info!(count = followers.list.len(), "fetched follower list");

        for follower in followers.list {
            if self.unfollow_once(follower.mid, state).await? {
                self.pace_and_report(state, progress).await;
            }
        }

        Ok(())
    }

    /// Unfollow `uid` unless it was already unfollowed in this run
    ///
    /// Returns whether a request was made.
    pub(super) async fn unfollow_once(&self, uid: u64, state: &mut RunState) -> Result<bool> {
        if state.unfollowed.contains(&uid) {
            tracing::debug!(uid, "already unfollowed in this run");
            return Ok(false);
        }

        let result = self.api.unfollow_user(uid).await?;
        if !result.is_success() {
            return Err(Error::UnfollowFailed {
                uid,
                code: result.code,
                message: result.error_message().to_string(),
            });
        }

        state.unfollowed.insert(uid);
        state.unfollow_count += 1;
        tracing::debug!(uid, "unfollowed");
        Ok(true)
    }
}
