//! Client side of the booking flow: draft validation, the retrying
//! submission protocol, and a form state object tying them together.

pub mod form;
pub mod machine;
pub mod submit;
pub mod transport;

pub use form::BookingForm;
pub use machine::{Failure, InvalidTransition, RetryPolicy, State, SubmissionMachine};
pub use submit::{Outcome, Progress, SubmissionClient};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

use crate::api_types::BookingRequest;
use crate::models::booking::BookingParams;
use crate::rules::{self, FieldErrors, RuleSet};

/// Unsaved form state. Same shape as the wire payload; `Draft::default()` is
/// the empty form.
pub type Draft = BookingParams;

/// A draft that passed client-side validation. Only [`validate_draft`]
/// produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    params: BookingParams,
}

impl ValidatedDraft {
    pub fn to_request(&self) -> BookingRequest {
        BookingRequest {
            booking: self.params.clone(),
        }
    }
}

/// Check a draft against the client rules. Pure; no I/O.
pub fn validate_draft(draft: &Draft) -> Result<ValidatedDraft, FieldErrors> {
    rules::validate(draft, &RuleSet::CLIENT)?;
    Ok(ValidatedDraft {
        params: draft.clone(),
    })
}
