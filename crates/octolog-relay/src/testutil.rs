//! Shared fixtures for pipeline and route tests.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use octolog_core::{DeploymentEvent, Payload, Subscription};

use crate::config::Config;
use crate::mappings::{CATEGORY_TO_EMOJI, PROJECT_TO_CHANNEL};
use crate::sink::{ChatMessage, NotificationSink, SinkError};
use crate::state::AppState;
use crate::store::{collections, DocumentStore, MemoryStore};

/// Sink double that records delivered messages, or fails every delivery
/// with the given status.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<ChatMessage>>,
    fail_with_status: Option<u16>,
}

impl RecordingSink {
    pub fn failing(status: u16) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail_with_status: Some(status),
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &ChatMessage) -> Result<(), SinkError> {
        if let Some(status) = self.fail_with_status {
            return Err(SinkError::Status(status));
        }
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

/// Payload matching the seeded mappings: category `Deploy`, project
/// `Projects-42`.
pub fn sample_payload() -> Payload {
    Payload {
        event: DeploymentEvent {
            id: "Events-1234".to_string(),
            category: "Deploy".to_string(),
            message: "Deploy succeeded".to_string(),
            related_document_ids: vec!["Tasks-9".to_string(), "Projects-42".to_string()],
        },
        subscription: Subscription {
            name: "Deploy watch".to_string(),
        },
    }
}

/// The wire form of [`sample_payload`], wrapped in the `Payload` envelope.
pub fn sample_body() -> Vec<u8> {
    serde_json::to_vec(&json!({ "Payload": sample_payload() })).unwrap()
}

/// Memory store pre-seeded with both mapping documents.
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_if_absent(
            collections::MAPPINGS,
            CATEGORY_TO_EMOJI,
            &json!({"Deploy": "🚀"}),
        )
        .await
        .unwrap();
    store
        .insert_if_absent(
            collections::MAPPINGS,
            PROJECT_TO_CHANNEL,
            &json!({"Projects-42": "#releases"}),
        )
        .await
        .unwrap();
    store
}

/// App state wired to test doubles, secret `test-token`.
pub fn test_state(store: Arc<dyn DocumentStore>, sink: Arc<dyn NotificationSink>) -> AppState {
    let config = Config {
        bind_addr: "127.0.0.1:0".to_string(),
        auth_token: "test-token".to_string(),
        slack_uri: "https://hooks.slack.example/T000/B000/XXX".to_string(),
        store_path: PathBuf::from("unused"),
        metrics_port: 0,
    };
    AppState::new(config, store, sink)
}
