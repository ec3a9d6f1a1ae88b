//! Retry Schedule for Delivery Attempts
//!
//! The decision of what to do after each attempt is kept apart from the
//! I/O that produces the attempt, so it can be tested without a transport.
//!
//! ```text
//!            ┌──────────── Response(code) ──────────→ Delivered
//!            │
//! Attempt(k) ├── SessionFailed / NoResponse, k < max ─→ Retry { after_ms } → Attempt(k+1)
//!            │
//!            ├── SessionFailed, k = max ─────────────→ ExhaustedAfter { after_ms }
//!            │
//!            └── NoResponse, k = max ────────────────→ Exhausted
//! ```
//!
//! Any received response, including HTTP 4xx/5xx, ends the schedule as
//! delivered. Only connection-level failures are retried. The delay is
//! fixed (no backoff growth). A request that got no response waits only
//! when another attempt follows; a session that failed to open always
//! waits, the last attempt included. A zero delay never produces a wait.

use crate::constants::{MAX_RETRY_ATTEMPTS, RETRY_DELAY_MS};
use crate::traits::ResponseCode;

/// How many attempts to make and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u8,
    /// Wait between attempts in milliseconds
    pub delay_ms: u32,
}

impl RetryPolicy {
    /// Policy with explicit limits
    pub const fn new(max_attempts: u8, delay_ms: u32) -> Self {
        Self { max_attempts, delay_ms }
    }

    /// One attempt, no waiting; used when draining the offline buffer
    pub const fn single() -> Self {
        Self { max_attempts: 1, delay_ms: 0 }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRY_ATTEMPTS, RETRY_DELAY_MS)
    }
}

/// What happened on one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Session could not be opened
    SessionFailed,
    /// Request went out but no response came back
    NoResponse(ResponseCode),
    /// Server answered
    Response(ResponseCode),
}

/// Next step after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Payload reached the server
    Delivered(ResponseCode),
    /// Wait, then attempt again
    Retry {
        /// Delay before the next attempt
        after_ms: u32,
    },
    /// Wait, then give up; no attempts left
    ExhaustedAfter {
        /// Delay before giving up
        after_ms: u32,
    },
    /// No attempts left
    Exhausted,
}

/// Attempt counter for one send
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    attempt: u8,
    finished: bool,
}

impl RetrySchedule {
    /// Fresh schedule; no attempt made yet
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0, finished: false }
    }

    /// Start the next attempt
    ///
    /// Returns the 1-based attempt number, or `None` once the schedule has
    /// finished or the attempt budget is spent.
    pub fn begin_attempt(&mut self) -> Option<u8> {
        if self.finished || self.attempt >= self.policy.max_attempts {
            self.finished = true;
            return None;
        }

        self.attempt += 1;
        Some(self.attempt)
    }

    /// Record the outcome of the current attempt
    pub fn record(&mut self, outcome: AttemptOutcome) -> Step {
        match outcome {
            AttemptOutcome::Response(code) => {
                self.finished = true;
                Step::Delivered(code)
            }
            _ if self.attempt < self.policy.max_attempts => {
                Step::Retry { after_ms: self.policy.delay_ms }
            }
            AttemptOutcome::SessionFailed if self.policy.delay_ms > 0 => {
                self.finished = true;
                Step::ExhaustedAfter { after_ms: self.policy.delay_ms }
            }
            AttemptOutcome::SessionFailed | AttemptOutcome::NoResponse(_) => {
                self.finished = true;
                Step::Exhausted
            }
        }
    }

    /// Attempts started so far
    pub fn attempts(&self) -> u8 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_firmware() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_ms, 2_000);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let mut schedule = RetrySchedule::new(RetryPolicy::new(3, 2_000));
        let mut steps = Vec::new();

        while schedule.begin_attempt().is_some() {
            steps.push(schedule.record(AttemptOutcome::NoResponse(ResponseCode::CONNECTION_REFUSED)));
        }

        assert_eq!(
            steps,
            vec![
                Step::Retry { after_ms: 2_000 },
                Step::Retry { after_ms: 2_000 },
                Step::Exhausted,
            ]
        );
        assert_eq!(schedule.attempts(), 3);
    }

    #[test]
    fn error_status_is_delivered() {
        let mut schedule = RetrySchedule::new(RetryPolicy::default());
        assert_eq!(schedule.begin_attempt(), Some(1));
        assert_eq!(
            schedule.record(AttemptOutcome::Response(ResponseCode(500))),
            Step::Delivered(ResponseCode(500))
        );
        assert_eq!(schedule.begin_attempt(), None);
    }

    #[test]
    fn session_failure_consumes_an_attempt() {
        let mut schedule = RetrySchedule::new(RetryPolicy::new(2, 100));
        schedule.begin_attempt();
        assert_eq!(schedule.record(AttemptOutcome::SessionFailed), Step::Retry { after_ms: 100 });
        schedule.begin_attempt();
        assert_eq!(
            schedule.record(AttemptOutcome::SessionFailed),
            Step::ExhaustedAfter { after_ms: 100 }
        );
        assert_eq!(schedule.attempts(), 2);
        assert_eq!(schedule.begin_attempt(), None);
    }

    #[test]
    fn final_session_failure_waits_but_final_no_response_does_not() {
        let policy = RetryPolicy::new(1, 2_000);

        let mut schedule = RetrySchedule::new(policy);
        schedule.begin_attempt();
        assert_eq!(
            schedule.record(AttemptOutcome::SessionFailed),
            Step::ExhaustedAfter { after_ms: 2_000 }
        );

        let mut schedule = RetrySchedule::new(policy);
        schedule.begin_attempt();
        assert_eq!(
            schedule.record(AttemptOutcome::NoResponse(ResponseCode::CONNECTION_REFUSED)),
            Step::Exhausted
        );
    }

    #[test]
    fn zero_delay_session_failure_exhausts_without_waiting() {
        let mut schedule = RetrySchedule::new(RetryPolicy::single());
        schedule.begin_attempt();
        assert_eq!(schedule.record(AttemptOutcome::SessionFailed), Step::Exhausted);
    }

    #[test]
    fn single_attempt_never_waits() {
        let mut schedule = RetrySchedule::new(RetryPolicy::single());
        schedule.begin_attempt();
        assert_eq!(
            schedule.record(AttemptOutcome::NoResponse(ResponseCode::READ_TIMEOUT)),
            Step::Exhausted
        );
    }

    #[test]
    fn zero_attempts_is_immediately_exhausted() {
        let mut schedule = RetrySchedule::new(RetryPolicy::new(0, 2_000));
        assert_eq!(schedule.begin_attempt(), None);
        assert_eq!(schedule.attempts(), 0);
    }
}
