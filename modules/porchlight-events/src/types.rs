//! Core types for the event store. Domain-agnostic.

use serde::{Deserialize, Serialize};

/// An event as persisted by the store. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Milliseconds since the Unix epoch, assigned at emission.
    pub timestamp: i64,
    pub event_type: String,
    pub data: serde_json::Value,
}

/// An event to be emitted. The caller builds this; the store assigns
/// `id` and `timestamp` unless they are set explicitly.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: String,
    pub data: serde_json::Value,
    pub id: Option<String>,
    pub timestamp: Option<i64>,
}

impl NewEvent {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            id: None,
            timestamp: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
