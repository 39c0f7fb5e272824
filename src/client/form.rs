use crate::rules::{Field, FieldErrors};

use super::machine::{State, SubmissionMachine};
use super::submit::{Outcome, Progress, SubmissionClient};
use super::transport::Transport;
use super::{Draft, validate_draft};

/// Booking form state: the draft being edited, per-field errors, the status
/// line shown to the user, and the current submission's state machine.
pub struct BookingForm<T> {
    draft: Draft,
    errors: FieldErrors,
    message: String,
    machine: SubmissionMachine,
    client: SubmissionClient<T>,
}

impl<T: Transport> BookingForm<T> {
    pub fn new(client: SubmissionClient<T>) -> Self {
        let machine = SubmissionMachine::new(client.policy().max_attempts);
        Self {
            draft: Draft::default(),
            errors: FieldErrors::new(),
            message: String::new(),
            machine,
            client,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Update one field and drop any error shown for it.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.remove(field);
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn state(&self) -> &State {
        self.machine.state()
    }

    /// The submit trigger should be disabled while this is true.
    pub fn is_submitting(&self) -> bool {
        self.machine.is_active()
    }

    /// Validate and submit the draft. On success the draft is reset to the
    /// empty form; on any other outcome it is kept for correction.
    pub async fn submit(&mut self) -> Outcome {
        self.submit_with_progress(|_| {}).await
    }

    /// As [`submit`](Self::submit), reporting each attempt and failure to
    /// `on_progress` as it happens.
    pub async fn submit_with_progress(
        &mut self,
        mut on_progress: impl FnMut(&Progress),
    ) -> Outcome {
        self.message.clear();
        self.errors = FieldErrors::new();
        self.machine = SubmissionMachine::new(self.client.policy().max_attempts);

        let validated = validate_draft(&self.draft);
        let message = &mut self.message;
        let outcome = self
            .client
            .drive(&mut self.machine, validated.as_ref(), |progress| {
                *message = progress.message();
                on_progress(&progress);
            })
            .await;

        match &outcome {
            Outcome::Success { .. } => {
                log::info!("Booking submitted, resetting form");
                self.draft = Draft::default();
            }
            Outcome::Invalid(errors) | Outcome::Rejected(errors) => {
                self.errors = errors.clone();
            }
            Outcome::ExhaustedRetries { .. } | Outcome::Aborted(_) => {}
        }
        self.message = outcome.message();
        outcome
    }
}
