use std::fmt;
use std::future::Future;

use reqwest::header::ACCEPT;

use crate::api_types::BookingRequest;
use crate::models::booking::Booking;

/// Raw answer to one request: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::new(e.to_string())
    }
}

/// Sends a booking to the server. Timeouts are applied by the caller.
pub trait Transport {
    fn post_booking(
        &self,
        request: &BookingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// [`Transport`] over HTTP against a running booking server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn bookings_url(&self) -> String {
        format!("{}/api/v1/bookings", self.base_url)
    }

    /// GET /api/v1/bookings
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, TransportError> {
        let response = self
            .client
            .get(self.bookings_url())
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl Transport for HttpTransport {
    async fn post_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(self.bookings_url())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
