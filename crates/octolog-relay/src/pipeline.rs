//! The relay pipeline.
//!
//! Six ordered stages run per inbound request, each short-circuiting to a
//! [`RelayError`] on failure:
//!
//! ```text
//! authorize → extract payload → dedupe → load mappings → compose → forward
//! ```
//!
//! Every stage is attempt-once. The upstream tool owns retry policy on
//! non-2xx responses; a duplicate event short-circuits to a 200 precisely so
//! it is not retried. A sink failure after the dedupe write leaves the
//! deployment record in place: at-most-one notify attempt per event id, even
//! at the cost of a lost notification.

use axum::http::HeaderMap;
use serde::Deserialize;

use octolog_core::Payload;

use crate::config::Config;
use crate::error::RelayError;
use crate::mappings::Mappings;
use crate::sink::{ChatMessage, NotificationSink, ICON_EMOJI};
use crate::state::AppState;
use crate::store::{collections, DocumentStore, StoreError};

/// Request header carrying the shared webhook secret.
pub const AUTH_TOKEN_HEADER: &str = "octolog-token";

/// Inbound request body envelope.
#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(rename = "Payload")]
    payload: Option<Payload>,
}

/// Run one event through the full pipeline.
pub async fn process(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), RelayError> {
    authorize(&state.config, headers)?;
    metrics::counter!("relay_events_received_total").increment(1);

    let payload = extract_payload(body)?;
    record_deployment(state.store.as_ref(), &payload).await?;

    let mappings = state.mappings.get_or_load(state.store.as_ref()).await?;
    let message = compose_message(&payload, mappings);
    forward(state.sink.as_ref(), &message).await?;

    metrics::counter!("relay_events_forwarded_total").increment(1);
    Ok(())
}

/// Stage 1: exact-match the `octolog-token` header against the secret.
fn authorize(config: &Config, headers: &HeaderMap) -> Result<(), RelayError> {
    let provided = headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(token) if token == config.auth_token => Ok(()),
        _ => {
            metrics::counter!("relay_requests_unauthorized_total").increment(1);
            Err(RelayError::Unauthorized)
        }
    }
}

/// Stage 2: pull the `Payload` field out of the request body.
fn extract_payload(body: &[u8]) -> Result<Payload, RelayError> {
    let envelope: Option<WebhookBody> = serde_json::from_slice(body).ok();

    match envelope.and_then(|e| e.payload) {
        Some(payload) => Ok(payload),
        None => {
            metrics::counter!("relay_requests_invalid_total").increment(1);
            Err(RelayError::MissingPayload)
        }
    }
}

/// Stage 3: transactional check-and-set of the deployment record.
///
/// Under concurrent deliveries of the same event id, exactly one caller
/// creates the record and proceeds; the rest short-circuit to the
/// idempotent-success path.
async fn record_deployment(
    store: &dyn DocumentStore,
    payload: &Payload,
) -> Result<(), RelayError> {
    let document = serde_json::to_value(payload).map_err(StoreError::from)?;

    let inserted = store
        .insert_if_absent(collections::DEPLOYMENTS, &payload.event.id, &document)
        .await?;

    if !inserted {
        metrics::counter!("relay_events_duplicate_total").increment(1);
        return Err(RelayError::AlreadyProcessed(payload.event.id.clone()));
    }

    tracing::info!(event_id = %payload.event.id, "deployment recorded");
    Ok(())
}

/// Stage 5: compose the outbound chat message.
///
/// An unmapped project leaves the message without a channel (the sink's
/// default channel applies); an unmapped category leaves the text
/// undecorated.
pub fn compose_message(payload: &Payload, mappings: &Mappings) -> ChatMessage {
    let channel = payload
        .event
        .project_id()
        .and_then(|project| mappings.channel_for(project))
        .map(str::to_owned);

    let text = match mappings.emoji_for(&payload.event.category) {
        Some(emoji) => format!("{emoji} {} {emoji}", payload.event.message),
        None => payload.event.message.clone(),
    };

    ChatMessage {
        channel,
        username: format!("Octopus Subscription: {}", payload.subscription.name),
        icon_emoji: ICON_EMOJI.to_string(),
        text,
    }
}

/// Stage 6: single delivery attempt to the notification sink.
async fn forward(sink: &dyn NotificationSink, message: &ChatMessage) -> Result<(), RelayError> {
    if let Err(error) = sink.deliver(message).await {
        metrics::counter!("relay_delivery_failures_total").increment(1);
        return Err(error.into());
    }
    Ok(())
}
