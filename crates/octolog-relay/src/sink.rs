//! Notification sink collaborator.
//!
//! The relay's only outbound side effect is a single fire-and-forget POST of
//! a [`ChatMessage`] to a Slack-compatible incoming webhook. The transport
//! lives behind the [`NotificationSink`] trait; the pipeline never retries,
//! so a failed delivery surfaces to the caller and the upstream tool owns
//! any retry policy.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Icon shown next to every relayed message.
pub const ICON_EMOJI: &str = ":octopusdeploy:";

/// Request timeout for webhook deliveries.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// One formatted chat message, shaped for the Slack webhook API.
///
/// `channel` is omitted from the JSON body when the event's project has no
/// configured channel; the sink then posts to the webhook's default channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub username: String,
    pub icon_emoji: String,
    pub text: String,
}

/// Errors raised while delivering a notification.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The POST could not be sent (connect failure, timeout, bad URI).
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The sink answered with a non-success status.
    #[error("notification sink returned status {0}")]
    Status(u16),
}

/// Fire-and-forget chat delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message. Attempt-once: implementations must not retry.
    async fn deliver(&self, message: &ChatMessage) -> Result<(), SinkError>;
}

/// Slack incoming-webhook sink backed by a shared reqwest client.
pub struct SlackWebhook {
    client: reqwest::Client,
    uri: String,
}

impl SlackWebhook {
    /// Build a sink posting to the given webhook URI.
    pub fn new(uri: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            uri: uri.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for SlackWebhook {
    async fn deliver(&self, message: &ChatMessage) -> Result<(), SinkError> {
        let response = self.client.post(&self.uri).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status.as_u16()));
        }

        tracing::debug!(channel = ?message.channel, "notification delivered");
        Ok(())
    }
}
