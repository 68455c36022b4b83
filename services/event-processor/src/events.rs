//! Event Grid notifications that trigger processing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUBSCRIPTION_VALIDATION_EVENT: &str = "Microsoft.EventGrid.SubscriptionValidationEvent";
pub const BLOB_CREATED_EVENT: &str = "Microsoft.Storage.BlobCreated";

/// Extension of the forecast files this service processes.
pub const FORECAST_EXTENSION: &str = ".nc";

/// A single Event Grid event, in the Event Grid schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridEvent {
    #[serde(default)]
    pub id: String,
    pub event_type: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// What the service should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    /// Answer the subscription handshake with this code.
    Validate(String),
    /// Process a forecast file.
    Process(BlobRef),
    /// Nothing to do; carries the reason for logging.
    Ignore(String),
}

/// A blob named by a storage event subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub container: String,
    /// Blob name, possibly containing `/`-separated virtual directories.
    pub name: String,
}

impl BlobRef {
    /// Parse `/blobServices/default/containers/<container>/blobs/<name>`.
    pub fn from_subject(subject: &str) -> Option<Self> {
        let rest = subject.strip_prefix("/blobServices/default/containers/")?;
        let (container, name) = rest.split_once("/blobs/")?;

        if container.is_empty() || name.is_empty() {
            return None;
        }

        Some(Self {
            container: container.to_string(),
            name: name.to_string(),
        })
    }

    pub fn is_forecast(&self) -> bool {
        self.name.ends_with(FORECAST_EXTENSION)
    }
}

impl EventGridEvent {
    pub fn action(&self) -> EventAction {
        match self.event_type.as_str() {
            SUBSCRIPTION_VALIDATION_EVENT => match self.data.get("validationCode") {
                Some(Value::String(code)) => EventAction::Validate(code.clone()),
                _ => EventAction::Ignore("validation event without a validationCode".to_string()),
            },
            BLOB_CREATED_EVENT => match BlobRef::from_subject(&self.subject) {
                Some(blob) if blob.is_forecast() => EventAction::Process(blob),
                Some(blob) => EventAction::Ignore(format!("{} is not a forecast file", blob.name)),
                None => EventAction::Ignore(format!("unrecognised blob subject '{}'", self.subject)),
            },
            other => EventAction::Ignore(format!("unhandled event type {}", other)),
        }
    }
}
