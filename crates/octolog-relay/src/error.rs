//! Relay error types and response formatting.
//!
//! Every pipeline stage rejects with a [`RelayError`]; the `IntoResponse`
//! impl below is the single point that converts a rejection into an HTTP
//! response. The upstream automation tool string-matches the 401/400 bodies,
//! so those are exact plain text, and a duplicate event deliberately answers
//! 200 so the caller does not retry it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::mappings::MappingError;
use crate::sink::SinkError;
use crate::store::StoreError;

/// Errors that abort the relay pipeline.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The `octolog-token` header was absent or did not match the secret.
    #[error("missing or invalid token")]
    Unauthorized,

    /// The request body carried no usable `Payload` field.
    #[error("no payload provided")]
    MissingPayload,

    /// The event id already has a deployment record. Not a true error: it
    /// short-circuits to an idempotent success.
    #[error("event {0} has already been processed")]
    AlreadyProcessed(String),

    /// The enrichment tables could not be loaded.
    #[error("mapping load failed: {0}")]
    MappingLoad(#[from] MappingError),

    /// The document store failed during deduplication.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The notification sink was unreachable or rejected the POST.
    #[error("delivery failed: {0}")]
    Delivery(#[from] SinkError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => {
                tracing::warn!("Missing or invalid token");
                (StatusCode::UNAUTHORIZED, "Missing or invalid token").into_response()
            }
            Self::MissingPayload => {
                tracing::warn!("No payload provided");
                (StatusCode::BAD_REQUEST, "No payload provided").into_response()
            }
            Self::AlreadyProcessed(event_id) => {
                let message = format!("Event {event_id} has already been processed.");
                tracing::warn!("{message}");
                (StatusCode::OK, message).into_response()
            }
            // Internal failures are indistinguishable to the caller from a
            // generic bad request: bare 400, raw error in the logs only.
            internal @ (Self::MappingLoad(_) | Self::Store(_) | Self::Delivery(_)) => {
                tracing::warn!(error = %internal, "relay pipeline failed");
                StatusCode::BAD_REQUEST.into_response()
            }
        }
    }
}
