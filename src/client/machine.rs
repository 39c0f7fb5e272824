//! Submission lifecycle as an explicit finite-state machine.
//!
//! ```text
//! Idle -> Validating -> Invalid
//!                    -> Submitting -> Success
//!                                  -> Rejected
//!                                  -> RetryWait -> Submitting
//!                                  -> ExhaustedRetries
//! ```
//!
//! The machine performs no I/O. A driver feeds it events; see
//! [`SubmissionClient`](super::SubmissionClient).

use std::fmt;
use std::time::Duration;

use crate::rules::FieldErrors;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Why an attempt failed in a way worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Timeout,
    Network(String),
    UnexpectedStatus(u16),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Timeout => write!(f, "request timed out"),
            Failure::Network(e) => write!(f, "network error: {e}"),
            Failure::UnexpectedStatus(status) => write!(f, "unexpected status {status}"),
        }
    }
}

/// What one round-trip produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Created { booking_id: Option<i64> },
    Rejected(FieldErrors),
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Validating,
    Invalid(FieldErrors),
    Submitting { attempt: u32 },
    /// `attempt` is the attempt that just failed.
    RetryWait { attempt: u32, failure: Failure },
    Success { booking_id: Option<i64> },
    Rejected(FieldErrors),
    ExhaustedRetries { attempts: u32, failure: Failure },
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Idle => "Idle",
            State::Validating => "Validating",
            State::Invalid(_) => "Invalid",
            State::Submitting { .. } => "Submitting",
            State::RetryWait { .. } => "RetryWait",
            State::Success { .. } => "Success",
            State::Rejected(_) => "Rejected",
            State::ExhaustedRetries { .. } => "ExhaustedRetries",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            State::Invalid(_)
                | State::Success { .. }
                | State::Rejected(_)
                | State::ExhaustedRetries { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Validated(Result<(), FieldErrors>),
    Response(AttemptResult),
    RetryElapsed,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Start => "Start",
            Event::Validated(_) => "Validated",
            Event::Response(_) => "Response",
            Event::RetryElapsed => "RetryElapsed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {} is not accepted in state {}", self.event, self.state)
    }
}

impl std::error::Error for InvalidTransition {}

/// One submission's lifecycle. Create a new machine per submission.
#[derive(Debug, Clone)]
pub struct SubmissionMachine {
    state: State,
    max_attempts: u32,
}

impl SubmissionMachine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: State::Idle,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// A submission is underway: the trigger must stay disabled.
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            State::Validating | State::Submitting { .. } | State::RetryWait { .. }
        )
    }

    /// Apply `event`. On an illegal transition the state is left unchanged.
    pub fn handle(&mut self, event: Event) -> Result<&State, InvalidTransition> {
        let next = match (&self.state, event) {
            (State::Idle, Event::Start) => State::Validating,
            (State::Validating, Event::Validated(Ok(()))) => State::Submitting { attempt: 1 },
            (State::Validating, Event::Validated(Err(errors))) => State::Invalid(errors),
            (State::Submitting { attempt }, Event::Response(result)) => {
                let attempt = *attempt;
                match result {
                    AttemptResult::Created { booking_id } => State::Success { booking_id },
                    AttemptResult::Rejected(errors) => State::Rejected(errors),
                    AttemptResult::Failed(failure) if attempt < self.max_attempts => {
                        State::RetryWait { attempt, failure }
                    }
                    AttemptResult::Failed(failure) => State::ExhaustedRetries {
                        attempts: attempt,
                        failure,
                    },
                }
            }
            (State::RetryWait { attempt, .. }, Event::RetryElapsed) => State::Submitting {
                attempt: attempt + 1,
            },
            (state, event) => {
                return Err(InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                });
            }
        };

        log::debug!("Submission {} -> {}", self.state.name(), next.name());
        self.state = next;
        Ok(&self.state)
    }
}
