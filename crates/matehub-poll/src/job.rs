// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The poll state machine, independent of timers and I/O.
//!
//! [`PollJob`] holds the attempt counter, current delay, and state; the
//! transition function [`PollJob::observe`] is pure so the backoff and
//! budget behavior can be tested without a runtime.

use std::time::Duration;

/// Tuning knobs for one poll sequence.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum status fetches before giving up.
    pub max_attempts: u32,
    /// Delay before the first re-poll.
    pub initial_delay: Duration,
    /// Upper bound on the inter-poll delay.
    pub max_delay: Duration,
    /// Multiplicative delay growth per progressing attempt, capped at
    /// `max_delay`. Monotonically increasing and bounded, not exponential.
    pub backoff_factor: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
            backoff_factor: 1.2,
        }
    }
}

/// States of a poll job. `Succeeded`, `Failed`, and `TimedOut` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// The backend has not started processing the job.
    Pending,
    /// The backend is processing the job.
    Processing,
    /// Terminal: the job completed and a result is available.
    Succeeded,
    /// Terminal: the backend reported failure.
    Failed,
    /// Terminal: the attempt budget was exhausted.
    TimedOut,
}

impl std::fmt::Display for PollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollState::Pending => write!(f, "pending"),
            PollState::Processing => write!(f, "processing"),
            PollState::Succeeded => write!(f, "succeeded"),
            PollState::Failed => write!(f, "failed"),
            PollState::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Classification of one fetch outcome, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Backend says the job is still queued.
    Pending,
    /// Backend says the job is being processed.
    Processing,
    /// Backend returned a status string this client does not recognize.
    /// Non-terminal: newer backend states must not break older clients.
    Unknown,
    /// Terminal success.
    Succeeded,
    /// Terminal failure reported by the backend.
    Failed,
    /// The fetch itself failed (network). Counts against the budget but
    /// does not abort the sequence.
    FetchError,
}

/// One in-flight poll sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollJob {
    /// Completed fetch attempts (successful or not).
    pub attempts: u32,
    /// Delay to wait before the next fetch.
    pub delay: Duration,
    /// Current state.
    pub state: PollState,
}

impl PollJob {
    /// A fresh job with no attempts and the initial delay.
    pub fn new(config: &PollConfig) -> Self {
        Self {
            attempts: 0,
            delay: config.initial_delay,
            state: PollState::Pending,
        }
    }

    /// True when no further fetch may be issued. Checked before each
    /// attempt, never after.
    pub fn budget_exhausted(&self, config: &PollConfig) -> bool {
        self.attempts >= config.max_attempts
    }

    /// Pure transition: fold one fetch outcome into the job.
    ///
    /// Every observation consumes one attempt. The delay grows only while
    /// the backend is making recognizable progress (`Pending`/`Processing`);
    /// unknown statuses and fetch errors retry after the current delay
    /// unchanged.
    pub fn observe(&self, config: &PollConfig, observation: Observation) -> PollJob {
        let attempts = self.attempts + 1;
        let (state, delay) = match observation {
            Observation::Pending => (PollState::Pending, grow(self.delay, config)),
            Observation::Processing => (PollState::Processing, grow(self.delay, config)),
            Observation::Unknown | Observation::FetchError => (self.state, self.delay),
            Observation::Succeeded => (PollState::Succeeded, self.delay),
            Observation::Failed => (PollState::Failed, self.delay),
        };
        PollJob {
            attempts,
            delay,
            state,
        }
    }

    /// Marks the job as timed out after a failed budget check.
    pub fn timed_out(&self) -> PollJob {
        PollJob {
            state: PollState::TimedOut,
            ..self.clone()
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            PollState::Succeeded | PollState::Failed | PollState::TimedOut
        )
    }
}

/// Next delay: multiplicative growth capped at `max_delay`.
fn grow(delay: Duration, config: &PollConfig) -> Duration {
    let scaled = delay.mul_f64(config.backoff_factor);
    scaled.min(config.max_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PollConfig {
        PollConfig::default()
    }

    #[test]
    fn fresh_job_starts_pending_with_initial_delay() {
        let job = PollJob::new(&config());
        assert_eq!(job.attempts, 0);
        assert_eq!(job.delay, Duration::from_millis(1000));
        assert_eq!(job.state, PollState::Pending);
        assert!(!job.is_terminal());
    }

    #[test]
    fn delay_grows_multiplicatively_while_progressing() {
        let cfg = config();
        let job = PollJob::new(&cfg)
            .observe(&cfg, Observation::Pending)
            .observe(&cfg, Observation::Processing);
        assert_eq!(job.attempts, 2);
        // 1000 * 1.2 * 1.2 = 1440
        assert_eq!(job.delay, Duration::from_millis(1440));
        assert_eq!(job.state, PollState::Processing);
    }

    #[test]
    fn delay_is_capped_at_max() {
        let cfg = config();
        let mut job = PollJob::new(&cfg);
        for _ in 0..40 {
            job = job.observe(&cfg, Observation::Processing);
        }
        assert_eq!(job.delay, Duration::from_millis(5000));
    }

    #[test]
    fn unknown_status_counts_attempt_but_keeps_delay() {
        let cfg = config();
        let job = PollJob::new(&cfg).observe(&cfg, Observation::Unknown);
        assert_eq!(job.attempts, 1);
        assert_eq!(job.delay, Duration::from_millis(1000));
        assert!(!job.is_terminal());
    }

    #[test]
    fn fetch_error_counts_attempt_without_aborting() {
        let cfg = config();
        let job = PollJob::new(&cfg)
            .observe(&cfg, Observation::Processing)
            .observe(&cfg, Observation::FetchError);
        assert_eq!(job.attempts, 2);
        assert_eq!(job.state, PollState::Processing);
        assert!(!job.is_terminal());
    }

    #[test]
    fn terminal_observations_end_the_job() {
        let cfg = config();
        assert_eq!(
            PollJob::new(&cfg).observe(&cfg, Observation::Succeeded).state,
            PollState::Succeeded
        );
        assert_eq!(
            PollJob::new(&cfg).observe(&cfg, Observation::Failed).state,
            PollState::Failed
        );
    }

    #[test]
    fn budget_is_checked_before_each_attempt() {
        let cfg = PollConfig {
            max_attempts: 3,
            ..config()
        };
        let mut job = PollJob::new(&cfg);
        assert!(!job.budget_exhausted(&cfg));
        for _ in 0..3 {
            job = job.observe(&cfg, Observation::Pending);
        }
        assert!(job.budget_exhausted(&cfg));
        let job = job.timed_out();
        assert_eq!(job.state, PollState::TimedOut);
        assert!(job.is_terminal());
    }

    #[test]
    fn poll_state_display() {
        assert_eq!(PollState::Pending.to_string(), "pending");
        assert_eq!(PollState::Processing.to_string(), "processing");
        assert_eq!(PollState::Succeeded.to_string(), "succeeded");
        assert_eq!(PollState::Failed.to_string(), "failed");
        assert_eq!(PollState::TimedOut.to_string(), "timed_out");
    }
}
