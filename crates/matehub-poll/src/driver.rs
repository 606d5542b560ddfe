// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cooperative polling loop.
//!
//! [`poll`] repeatedly invokes a status fetcher, folds each outcome into a
//! [`PollJob`], and sleeps the job's current delay between attempts. The
//! loop is single-flight by construction: each tick awaits the next rather
//! than running reentrantly, so no locking is needed. Cancellation is the
//! caller dropping the future.

use std::future::Future;

use matehub_core::{MatehubError, ReplyPhase, ReplyStatus};
use tracing::{debug, warn};

use crate::job::{Observation, PollConfig, PollJob};

/// One classified status fetch, carrying the success payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollUpdate<T> {
    /// Job is queued.
    Pending,
    /// Job is being processed.
    Processing,
    /// Unrecognized status; keep polling.
    Unknown,
    /// Terminal success with the result payload.
    Succeeded(T),
    /// Terminal failure with the server-supplied reason.
    Failed(String),
}

impl<T> PollUpdate<T> {
    fn observation(&self) -> Observation {
        match self {
            PollUpdate::Pending => Observation::Pending,
            PollUpdate::Processing => Observation::Processing,
            PollUpdate::Unknown => Observation::Unknown,
            PollUpdate::Succeeded(_) => Observation::Succeeded,
            PollUpdate::Failed(_) => Observation::Failed,
        }
    }
}

/// A chat reply status is a poll update whose payload is the optional
/// summary text carried by the status endpoint.
impl From<ReplyStatus> for PollUpdate<Option<String>> {
    fn from(status: ReplyStatus) -> Self {
        match status {
            ReplyStatus::InProgress(ReplyPhase::Pending) => PollUpdate::Pending,
            ReplyStatus::InProgress(ReplyPhase::Processing) => PollUpdate::Processing,
            ReplyStatus::InProgress(ReplyPhase::Unknown) => PollUpdate::Unknown,
            ReplyStatus::Completed { summary } => PollUpdate::Succeeded(summary),
            ReplyStatus::Failed { reason } => PollUpdate::Failed(reason),
        }
    }
}

/// Polls `fetch` until a terminal state or budget exhaustion.
///
/// - `on_progress` is invoked after every successful fetch with the update
///   and the attempt count (starting at 1).
/// - Fetch errors are absorbed: they consume an attempt and the loop
///   retries after the current delay. Only budget exhaustion turns the
///   last transient error into the terminal result.
/// - Budget exhaustion with no pending transient error yields
///   [`MatehubError::PollTimeout`].
pub async fn poll<T, F, Fut, P>(
    config: &PollConfig,
    mut fetch: F,
    mut on_progress: P,
) -> Result<T, MatehubError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollUpdate<T>, MatehubError>>,
    P: FnMut(&PollUpdate<T>, u32),
{
    let mut job = PollJob::new(config);
    let mut last_transient: Option<MatehubError> = None;

    loop {
        if job.budget_exhausted(config) {
            let job = job.timed_out();
            warn!(attempts = job.attempts, "poll budget exhausted");
            return Err(match last_transient.take() {
                Some(err) => err,
                None => MatehubError::PollTimeout {
                    attempts: job.attempts,
                },
            });
        }

        match fetch().await {
            Ok(update) => {
                job = job.observe(config, update.observation());
                last_transient = None;
                debug!(
                    attempt = job.attempts,
                    state = %job.state,
                    "poll status received"
                );
                on_progress(&update, job.attempts);

                match update {
                    PollUpdate::Succeeded(value) => return Ok(value),
                    PollUpdate::Failed(reason) => {
                        return Err(MatehubError::PollFailed { reason });
                    }
                    _ => {}
                }
            }
            Err(err) => {
                job = job.observe(config, Observation::FetchError);
                warn!(
                    attempt = job.attempts,
                    error = %err,
                    "poll fetch failed, will retry"
                );
                last_transient = Some(err);
            }
        }

        // The next iteration cannot fetch once the budget is spent, so
        // the timeout surfaces without a trailing sleep.
        if !job.budget_exhausted(config) {
            tokio::time::sleep(job.delay).await;
        }
    }
}
