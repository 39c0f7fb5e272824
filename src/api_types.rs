//! JSON envelopes exchanged on `/api/v1/bookings`.

use serde::{Deserialize, Serialize};

use crate::models::booking::{Booking, BookingParams};

pub const CREATED_MESSAGE: &str = "Booking created successfully!";

/// `POST /api/v1/bookings` request body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BookingRequest {
    pub booking: BookingParams,
}

/// `201 Created` response body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BookingCreatedResponse {
    pub message: String,
    pub booking: Booking,
}

/// `422 Unprocessable Entity` response body: full messages, one per violated rule.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
}

/// Any other error response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub message: String,
}
