//! Client submission protocol against scripted transports, on paused tokio
//! time so timeouts and retry delays run instantly.

mod common;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use bookify::api_types::BookingRequest;
use bookify::client::{
    BookingForm, Draft, Failure, Outcome, Progress, RetryPolicy, State, SubmissionClient, Transport,
    TransportError, TransportResponse, validate_draft,
};
use bookify::rules::{self, Field};

#[derive(Debug, Clone)]
enum Reply {
    Respond(u16, &'static str),
    Fail(&'static str),
    Hang,
}

/// Plays back `replies` in order, repeating the last one forever.
#[derive(Clone)]
struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<AtomicU32>,
    sent: Arc<Mutex<Vec<BookingRequest>>>,
}

impl ScriptedTransport {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            calls: Arc::new(AtomicU32::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().expect("empty script")
        }
    }
}

impl Transport for ScriptedTransport {
    async fn post_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(request.clone());

        match self.next_reply() {
            Reply::Respond(status, body) => Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            Reply::Fail(message) => Err(TransportError::new(message)),
            Reply::Hang => std::future::pending().await,
        }
    }
}

const CREATED_42: &str =
    r#"{"message":"Booking created successfully!","booking":{"id":42,"email":"ada@example.com"}}"#;

fn form_with(transport: ScriptedTransport) -> BookingForm<ScriptedTransport> {
    BookingForm::new(SubmissionClient::new(transport, RetryPolicy::default()))
}

fn fill(form: &mut BookingForm<ScriptedTransport>) {
    let params = common::valid_params();
    for field in Field::ALL {
        form.set_field(field, params.value(field));
    }
}

#[tokio::test(start_paused = true)]
async fn test_success_reports_id_and_resets_form() {
    let transport = ScriptedTransport::new([Reply::Respond(201, CREATED_42)]);
    let mut form = form_with(transport.clone());
    fill(&mut form);

    let outcome = form.submit().await;

    assert_eq!(outcome, Outcome::Success { booking_id: Some(42) });
    assert_eq!(transport.calls(), 1);
    assert!(form.message().contains("Booking ID: 42"));
    assert_eq!(form.draft(), &Draft::default());
    assert!(form.errors().is_empty());
    assert!(!form.is_submitting());
    assert!(matches!(form.state(), State::Success { .. }));

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent[0].booking, common::valid_params());
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_exhaust_after_three_attempts() {
    let transport = ScriptedTransport::new([Reply::Hang]);
    let mut form = form_with(transport.clone());
    fill(&mut form);
    let before = form.draft().clone();

    let started = Instant::now();
    let outcome = form.submit().await;
    let elapsed = started.elapsed();

    assert_eq!(
        outcome,
        Outcome::ExhaustedRetries {
            attempts: 3,
            last_failure: Failure::Timeout,
        }
    );
    assert_eq!(transport.calls(), 3);
    // three 60s timeouts plus two 10s waits
    assert!(elapsed >= Duration::from_secs(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(201), "{elapsed:?}");
    assert!(form.message().starts_with("Error: Could not connect to the server"));
    assert_eq!(form.draft(), &before);
}

#[tokio::test(start_paused = true)]
async fn test_rejection_is_not_retried() {
    let transport = ScriptedTransport::new([Reply::Respond(
        422,
        r#"{"errors":["Email has already been taken"]}"#,
    )]);
    let mut form = form_with(transport.clone());
    fill(&mut form);

    let outcome = form.submit().await;

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert_eq!(transport.calls(), 1);
    assert_eq!(form.errors().get(Field::Email), Some(rules::TAKEN));
    assert_eq!(
        form.message(),
        "Error: Please correct the following issues:\nEmail has already been taken"
    );
    assert_eq!(form.draft().email, common::TEST_EMAIL);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_then_success() {
    let transport = ScriptedTransport::new([
        Reply::Respond(500, "Internal Server Error"),
        Reply::Respond(201, CREATED_42),
    ]);
    let draft = validate_draft(&common::valid_params()).expect("valid draft");
    let mut client = SubmissionClient::new(transport.clone(), RetryPolicy::default());

    let mut progress = Vec::new();
    let outcome = client
        .submit_with_progress(&draft, |p| progress.push(p))
        .await;

    assert_eq!(outcome, Outcome::Success { booking_id: Some(42) });
    assert_eq!(transport.calls(), 2);
    assert_eq!(
        progress,
        vec![
            Progress::Attempting { attempt: 1, max_attempts: 3 },
            Progress::AttemptFailed {
                attempt: 1,
                failure: Failure::UnexpectedStatus(500),
                retrying: true,
            },
            Progress::Attempting { attempt: 2, max_attempts: 3 },
        ]
    );
    assert_eq!(
        progress[1].message(),
        "Error: Booking failed with status 500. Retrying..."
    );
}

#[tokio::test(start_paused = true)]
async fn test_network_errors_are_retried_then_reported() {
    let transport = ScriptedTransport::new([Reply::Fail("connection refused")]);
    let draft = validate_draft(&common::valid_params()).expect("valid draft");
    let mut client = SubmissionClient::new(transport.clone(), RetryPolicy::default());

    let mut progress = Vec::new();
    let outcome = client
        .submit_with_progress(&draft, |p| progress.push(p))
        .await;

    assert_eq!(
        outcome,
        Outcome::ExhaustedRetries {
            attempts: 3,
            last_failure: Failure::Network("connection refused".to_string()),
        }
    );
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        progress.last(),
        Some(&Progress::AttemptFailed {
            attempt: 3,
            failure: Failure::Network("connection refused".to_string()),
            retrying: false,
        })
    );
    assert_eq!(
        progress[1].message(),
        "Network error (Attempt 1): Please check connection. Retrying..."
    );
}

#[tokio::test(start_paused = true)]
async fn test_persistent_bad_status_reports_status() {
    let transport = ScriptedTransport::new([Reply::Respond(503, "")]);
    let mut form = form_with(transport.clone());
    fill(&mut form);

    form.submit().await;

    assert_eq!(transport.calls(), 3);
    assert_eq!(form.message(), "Error: Booking failed with status 503.");
}

#[tokio::test(start_paused = true)]
async fn test_custom_policy_bounds_attempts() {
    let transport = ScriptedTransport::new([Reply::Hang]);
    let policy = RetryPolicy {
        max_attempts: 2,
        attempt_timeout: Duration::from_secs(5),
        retry_delay: Duration::from_secs(1),
    };
    let draft = validate_draft(&common::valid_params()).expect("valid draft");
    let mut client = SubmissionClient::new(transport.clone(), policy);

    let started = Instant::now();
    let outcome = client.submit(&draft).await;

    assert!(matches!(outcome, Outcome::ExhaustedRetries { attempts: 2, .. }));
    assert_eq!(transport.calls(), 2);
    assert!(started.elapsed() >= Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_draft_is_never_sent() {
    let transport = ScriptedTransport::new([Reply::Respond(201, CREATED_42)]);
    let mut form = form_with(transport.clone());
    form.set_field(Field::FirstName, "Ada");

    let outcome = form.submit().await;

    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert_eq!(transport.calls(), 0);
    assert_eq!(form.message(), "Please fix the errors in the form.");
    assert_eq!(form.draft().first_name, "Ada");
    assert!(!form.errors().contains(Field::FirstName));
    assert_eq!(form.errors().get(Field::LastName), Some(rules::BLANK));
    assert_eq!(form.errors().get(Field::Interest), Some(rules::BLANK));
    assert!(matches!(form.state(), State::Invalid(_)));
}

#[tokio::test(start_paused = true)]
async fn test_departure_before_arrival_blocks_submission() {
    let transport = ScriptedTransport::new([Reply::Respond(201, CREATED_42)]);
    let mut form = form_with(transport.clone());
    fill(&mut form);
    form.set_field(Field::ArrivalDate, "2025-07-10");
    form.set_field(Field::DepartureDate, "2025-07-05");

    let outcome = form.submit().await;

    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert_eq!(transport.calls(), 0);
    assert_eq!(form.errors().fields(), vec![Field::DepartureDate]);
    assert_eq!(
        form.errors().get(Field::DepartureDate),
        Some(rules::DEPARTURE_BEFORE_ARRIVAL)
    );
}

#[tokio::test(start_paused = true)]
async fn test_editing_a_field_clears_its_error() {
    let transport = ScriptedTransport::new([Reply::Respond(201, CREATED_42)]);
    let mut form = form_with(transport.clone());
    fill(&mut form);
    form.set_field(Field::Email, "not-an-email");
    form.set_field(Field::RoomType, "Penthouse");

    form.submit().await;
    assert_eq!(form.errors().get(Field::Email), Some(rules::INVALID));
    assert_eq!(form.errors().get(Field::RoomType), Some(rules::NOT_AN_OPTION));

    form.set_field(Field::Email, common::TEST_EMAIL);
    assert!(!form.errors().contains(Field::Email));
    assert!(form.errors().contains(Field::RoomType));

    form.set_field(Field::RoomType, "Luxus Room");
    let outcome = form.submit().await;
    assert!(outcome.is_success());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_form_reports_progress_in_order() {
    let transport = ScriptedTransport::new([
        Reply::Hang,
        Reply::Respond(500, ""),
        Reply::Respond(201, CREATED_42),
    ]);
    let mut form = form_with(transport.clone());
    fill(&mut form);

    let mut lines = Vec::new();
    let outcome = form
        .submit_with_progress(|progress| lines.push(progress.message()))
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        lines,
        [
            "Submitting... Attempt 1 of 3",
            "Request timed out (Attempt 1). Retrying...",
            "Submitting... Attempt 2 of 3",
            "Error: Booking failed with status 500. Retrying...",
            "Submitting... Attempt 3 of 3",
        ]
    );
    assert!(form.message().contains("Booking ID: 42"));
}

#[tokio::test(start_paused = true)]
async fn test_last_failure_is_reported_without_retry_notice() {
    let transport = ScriptedTransport::new([Reply::Hang]);
    let mut form = form_with(transport.clone());
    fill(&mut form);

    let mut lines = Vec::new();
    form.submit_with_progress(|progress| lines.push(progress.message()))
        .await;

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[3], "Request timed out (Attempt 2). Retrying...");
    assert_eq!(lines[5], "Request timed out (Attempt 3).");
}
