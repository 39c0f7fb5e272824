use serde::Deserialize;

use crate::api_types::{BookingRequest, ValidationErrorResponse};
use crate::rules::FieldErrors;

use super::ValidatedDraft;
use super::machine::{
    AttemptResult, Event, Failure, InvalidTransition, RetryPolicy, State, SubmissionMachine,
};
use super::transport::{Transport, TransportResponse};

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    Success { booking_id: Option<i64> },
    /// The server refused the booking. Not retried.
    Rejected(FieldErrors),
    ExhaustedRetries { attempts: u32, last_failure: Failure },
    /// The driver and the state machine disagreed; nothing more was sent.
    Aborted(InvalidTransition),
}

impl Outcome {
    /// The message shown to the user once the submission is over.
    pub fn message(&self) -> String {
        match self {
            Outcome::Invalid(_) => "Please fix the errors in the form.".to_string(),
            Outcome::Success { booking_id: Some(id) } => {
                format!("Your information has been sent successfully! Booking ID: {id}")
            }
            Outcome::Success { booking_id: None } => {
                "Your information has been sent successfully!".to_string()
            }
            Outcome::Rejected(errors) => format!(
                "Error: Please correct the following issues:\n{}",
                errors.full_messages().join("\n")
            ),
            Outcome::ExhaustedRetries {
                last_failure: Failure::UnexpectedStatus(status),
                ..
            } => format!("Error: Booking failed with status {status}."),
            Outcome::ExhaustedRetries { .. } => "Error: Could not connect to the server after \
                 multiple attempts. Please try again later."
                .to_string(),
            Outcome::Aborted(_) => {
                "Error: The submission stopped unexpectedly. Please try again.".to_string()
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Progress reported while a submission runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Attempting { attempt: u32, max_attempts: u32 },
    AttemptFailed { attempt: u32, failure: Failure, retrying: bool },
}

impl Progress {
    pub fn message(&self) -> String {
        match self {
            Progress::Attempting {
                attempt,
                max_attempts,
            } => format!("Submitting... Attempt {attempt} of {max_attempts}"),
            Progress::AttemptFailed {
                attempt,
                failure,
                retrying,
            } => {
                let line = match failure {
                    Failure::Timeout => format!("Request timed out (Attempt {attempt})."),
                    Failure::Network(_) => {
                        format!("Network error (Attempt {attempt}): Please check connection.")
                    }
                    Failure::UnexpectedStatus(status) => {
                        format!("Error: Booking failed with status {status}.")
                    }
                };
                if *retrying {
                    format!("{line} Retrying...")
                } else {
                    line
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct CreatedId {
    booking: IdOnly,
}

#[derive(Deserialize)]
struct IdOnly {
    id: i64,
}

/// Runs the bounded-retry submission protocol over a [`Transport`].
pub struct SubmissionClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> SubmissionClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit a validated draft. `&mut self` keeps a second submission from
    /// starting while this one is in flight.
    pub async fn submit(&mut self, draft: &ValidatedDraft) -> Outcome {
        self.submit_with_progress(draft, |_| {}).await
    }

    pub async fn submit_with_progress(
        &mut self,
        draft: &ValidatedDraft,
        on_progress: impl FnMut(Progress),
    ) -> Outcome {
        let mut machine = SubmissionMachine::new(self.policy.max_attempts);
        self.drive(&mut machine, Ok(draft), on_progress).await
    }

    /// Feed `machine` the event each state expects until it is terminal.
    ///
    /// `validation` is what local validation produced for the draft; an
    /// `Err` ends in `Invalid` without touching the transport.
    pub(crate) async fn drive(
        &self,
        machine: &mut SubmissionMachine,
        validation: Result<&ValidatedDraft, &FieldErrors>,
        mut on_progress: impl FnMut(Progress),
    ) -> Outcome {
        let request = validation.ok().map(ValidatedDraft::to_request);
        let max_attempts = machine.max_attempts();

        loop {
            let event = match (machine.state(), request.as_ref()) {
                (State::Invalid(errors), _) => return Outcome::Invalid(errors.clone()),
                (State::Success { booking_id }, _) => {
                    return Outcome::Success {
                        booking_id: *booking_id,
                    };
                }
                (State::Rejected(errors), _) => return Outcome::Rejected(errors.clone()),
                (State::ExhaustedRetries { attempts, failure }, _) => {
                    log::warn!("Giving up after {attempts} attempts: {failure}");
                    return Outcome::ExhaustedRetries {
                        attempts: *attempts,
                        last_failure: failure.clone(),
                    };
                }
                (State::Idle, _) => Event::Start,
                (State::Validating, _) => {
                    Event::Validated(validation.map(|_| ()).map_err(Clone::clone))
                }
                (State::Submitting { attempt }, Some(request)) => {
                    let attempt = *attempt;
                    on_progress(Progress::Attempting {
                        attempt,
                        max_attempts,
                    });
                    log::info!("Submitting booking, attempt {attempt} of {max_attempts}");

                    let result = self.attempt(request).await;
                    if let AttemptResult::Failed(failure) = &result {
                        log::warn!("Attempt {attempt} failed: {failure}");
                        on_progress(Progress::AttemptFailed {
                            attempt,
                            failure: failure.clone(),
                            retrying: attempt < max_attempts,
                        });
                    }
                    Event::Response(result)
                }
                (State::Submitting { .. }, None) => {
                    log::error!("Machine is submitting a draft that failed validation");
                    return Outcome::Aborted(InvalidTransition {
                        state: "Submitting",
                        event: "Validated",
                    });
                }
                (State::RetryWait { .. }, _) => {
                    tokio::time::sleep(self.policy.retry_delay).await;
                    Event::RetryElapsed
                }
            };

            if let Err(e) = machine.handle(event) {
                log::error!("Submission aborted: {e}");
                return Outcome::Aborted(e);
            }
        }
    }

    /// One round-trip, bounded by the attempt timeout.
    async fn attempt(&self, request: &BookingRequest) -> AttemptResult {
        let sent = tokio::time::timeout(
            self.policy.attempt_timeout,
            self.transport.post_booking(request),
        )
        .await;

        match sent {
            Err(_) => AttemptResult::Failed(Failure::Timeout),
            Ok(Err(e)) => AttemptResult::Failed(Failure::Network(e.to_string())),
            Ok(Ok(response)) => interpret(response),
        }
    }
}

/// Map a response onto the protocol: 2xx succeeds, 422 is a final rejection,
/// anything else is retried.
pub fn interpret(response: TransportResponse) -> AttemptResult {
    match response.status {
        200..=299 => {
            let booking_id = serde_json::from_str::<CreatedId>(&response.body)
                .map(|created| created.booking.id)
                .inspect_err(|e| log::warn!("Booking created but response unreadable: {e}"))
                .ok();
            AttemptResult::Created { booking_id }
        }
        422 => {
            let errors = match serde_json::from_str::<ValidationErrorResponse>(&response.body) {
                Ok(body) => FieldErrors::from_full_messages(&body.errors),
                Err(e) => {
                    log::warn!("Unreadable rejection body: {e}");
                    let mut errors = FieldErrors::new();
                    errors.add_base("Booking failed: Unknown error.");
                    errors
                }
            };
            AttemptResult::Rejected(errors)
        }
        status => AttemptResult::Failed(Failure::UnexpectedStatus(status)),
    }
}
