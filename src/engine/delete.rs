//! Repost deletion

use futures::TryStreamExt;

use super::{RunState, Sweeper};
use crate::classifier::classify;
use crate::error::{Error, Result};
use crate::types::{
    DeleteOptions, Event, FeedEntry, RunKind, RunOutcome, RunProgress, RunSummary,
};
use crate::walker::walk;

impl Sweeper {
    /// Delete the signed-in user's reposts, newest first
    ///
    /// Walks the whole feed. Non-reposts are never touched. With
    /// `lottery_only`, reposts whose original is not lottery-flagged are
    /// skipped. With `also_unfollow`, the author of each deleted repost is
    /// unfollowed once per run. `progress` is called after every deleted entry.
    ///
    /// The run stops at the first failed request; the returned summary then
    /// carries the error and the counts reached so far. Reposts whose nested
    /// content cannot be decoded are skipped and reported as
    /// [`Event::EntrySkipped`].
    ///
    /// # Errors
    /// Only rejections before the run starts: [`Error::AlreadyRunning`] and
    /// [`Error::NotOwnProfile`].
    pub async fn delete_reposts<P>(
        &self,
        options: DeleteOptions,
        mut progress: P,
    ) -> Result<RunSummary>
    where
        P: FnMut(&RunProgress) + Send,
    {
        let kind = RunKind::DeleteReposts { options };
        let mut guard = self.begin_run(kind)?;

        let outcome = match self.sweep_reposts(options, &mut guard.state, &mut progress).await {
            Ok(()) => RunOutcome::Completed,
            Err(error) => self.abort(&guard.state, error),
        };

        Ok(guard.finish(outcome))
    }

    async fn sweep_reposts<P>(
        &self,
        options: DeleteOptions,
        state: &mut RunState,
        progress: &mut P,
    ) -> Result<()>
    where
        P: FnMut(&RunProgress) + Send,
    {
        let mut pages = std::pin::pin!(walk(
            self.api.as_ref(),
            self.session_uid,
            state.offset.clone()
        ));

        while let Some(page) = pages.try_next().await? {
            for skipped in page.skipped {
                tracing::warn!(
                    entry_id = %skipped.entry_id,
                    error = %skipped.reason,
                    "skipping feed item with unreadable metadata"
                );
                self.emit(Event::EntrySkipped {
                    entry_id: skipped.entry_id,
                    reason: skipped.reason,
                });
            }

            for card in &page.entries {
                state.offset.clone_from(&card.desc.dynamic_id_str);

                let entry = match classify(card) {
                    Ok(Some(entry)) => entry,
                    Ok(None) => continue,
                    Err(e) => {
                        let reason = Error::from(e).to_string();
                        tracing::warn!(
                            entry_id = %card.desc.dynamic_id_str,
                            error = %reason,
                            "skipping repost with unreadable content"
                        );
                        self.emit(Event::EntrySkipped {
                            entry_id: card.desc.dynamic_id_str.clone(),
                            reason,
                        });
                        continue;
                    }
                };

                if options.lottery_only && !entry.is_lottery_flagged {
                    continue;
                }

                self.delete_entry(&entry, state).await?;

                if options.also_unfollow {
                    match entry.origin_author_id {
                        Some(author) => {
                            self.unfollow_once(author, state).await?;
                        }
                        None => tracing::warn!(
                            entry_id = %entry.entry_id,
                            "repost has no origin author, nothing to unfollow"
                        ),
                    }
                }

                self.pace_and_report(state, progress).await;
            }
        }

        Ok(())
    }

    async fn delete_entry(&self, entry: &FeedEntry, state: &mut RunState) -> Result<()> {
        let result = self.api.remove_dynamic(&entry.entry_id).await?;
        if !result.is_success() {
            return Err(Error::DeleteFailed {
                entry_id: entry.entry_id.clone(),
                code: result.code,
                message: result.error_message().to_string(),
            });
        }

        state.delete_count += 1;
        tracing::debug!(
            entry_id = %entry.entry_id,
            lottery = entry.is_lottery_flagged,
            "deleted repost"
        );
        Ok(())
    }
}
