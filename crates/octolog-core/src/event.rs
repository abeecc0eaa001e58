//! Inbound subscription payload model.
//!
//! Octopus Deploy subscriptions POST a JSON body whose `Payload` field
//! carries the event itself plus metadata about the subscription that fired.
//! Field names on the wire are PascalCase; the types here keep snake_case
//! internally and rename via serde.

use serde::{Deserialize, Serialize};

/// Related-document prefix that marks the originating project.
pub const PROJECT_ID_PREFIX: &str = "Projects-";

/// One deployment lifecycle notification from Octopus Deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentEvent {
    /// Unique event id, e.g. `"Events-1234"`. Dedupe key.
    pub id: String,

    /// Event category, e.g. `"DeploymentSucceeded"`. Drives emoji lookup.
    pub category: String,

    /// Human-readable event description.
    pub message: String,

    /// Ids of the documents this event relates to. Exactly one entry is
    /// expected to carry the `Projects-` prefix; see [`Self::project_id`].
    #[serde(default)]
    pub related_document_ids: Vec<String>,
}

impl DeploymentEvent {
    /// The id of the originating project, taken from the first
    /// `Projects-`-prefixed related document id.
    ///
    /// Returns `None` when the event carries no project reference. If the
    /// one-project invariant is violated, the first match wins.
    pub fn project_id(&self) -> Option<&str> {
        self.related_document_ids
            .iter()
            .map(String::as_str)
            .find(|id| id.starts_with(PROJECT_ID_PREFIX))
    }
}

/// The subscription (watch rule) that produced the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subscription {
    /// Display name of the subscription, e.g. `"Deployment notifications"`.
    pub name: String,
}

/// The full inbound request payload: event plus originating subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payload {
    pub event: DeploymentEvent,
    pub subscription: Subscription,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Event": {
            "Id": "Events-1234",
            "Category": "DeploymentSucceeded",
            "Message": "Deploy to Production succeeded for Web Portal release 1.2.3",
            "RelatedDocumentIds": ["Deployments-81", "Projects-42", "Environments-1"]
        },
        "Subscription": {
            "Name": "Deployment notifications"
        }
    }"#;

    #[test]
    fn payload_parses_pascal_case_wire_format() {
        let payload: Payload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.event.id, "Events-1234");
        assert_eq!(payload.event.category, "DeploymentSucceeded");
        assert_eq!(payload.event.related_document_ids.len(), 3);
        assert_eq!(payload.subscription.name, "Deployment notifications");
    }

    #[test]
    fn payload_round_trips_with_pascal_case_keys() {
        let payload: Payload = serde_json::from_str(SAMPLE).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["Event"]["Id"].is_string());
        assert!(json["Event"]["RelatedDocumentIds"].is_array());
        assert!(json["Subscription"]["Name"].is_string());
    }

    #[test]
    fn project_id_finds_prefixed_document() {
        let payload: Payload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.event.project_id(), Some("Projects-42"));
    }

    #[test]
    fn project_id_first_match_wins() {
        let event = DeploymentEvent {
            id: "Events-1".into(),
            category: "Deploy".into(),
            message: "m".into(),
            related_document_ids: vec![
                "Tasks-9".into(),
                "Projects-42".into(),
                "Projects-43".into(),
            ],
        };
        assert_eq!(event.project_id(), Some("Projects-42"));
    }

    #[test]
    fn project_id_none_without_project_reference() {
        let event = DeploymentEvent {
            id: "Events-1".into(),
            category: "Deploy".into(),
            message: "m".into(),
            related_document_ids: vec!["Tasks-9".into(), "Environments-1".into()],
        };
        assert_eq!(event.project_id(), None);
    }

    #[test]
    fn related_document_ids_default_to_empty() {
        let json = r#"{"Id": "Events-1", "Category": "Deploy", "Message": "m"}"#;
        let event: DeploymentEvent = serde_json::from_str(json).unwrap();
        assert!(event.related_document_ids.is_empty());
        assert_eq!(event.project_id(), None);
    }
}
