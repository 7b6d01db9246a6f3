//! Domain facts — the closed set of events this application understands.
//!
//! The `type` tag becomes the store's `event_type`; the full variant
//! serializes into the opaque payload. The store and its dispatch
//! machinery never match on this enum — only listeners do, which leaves
//! the event space open to types defined elsewhere.

use serde::{Deserialize, Serialize};

use porchlight_events::NewEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserRegistered {
        user_id: String,
        email: String,
        name: String,
        password_digest: String,
    },

    UserLoggedIn {
        user_id: String,
    },

    UserLoggedOut {
        user_id: String,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::UserLoggedIn { .. } => "user_logged_in",
            Self::UserLoggedOut { .. } => "user_logged_out",
        }
    }

    /// Serialize into a generic store event.
    pub fn into_new_event(self) -> NewEvent {
        let event_type = self.event_type();
        let data =
            serde_json::to_value(&self).expect("domain event serialization should never fail");
        NewEvent::new(event_type, data)
    }

    /// Deserialize from a stored event's payload.
    pub fn from_event_data(data: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_matches_serde_tag() {
        let event = DomainEvent::UserRegistered {
            user_id: "u-1".into(),
            email: "ada@example.org".into(),
            name: "Ada".into(),
            password_digest: "digest".into(),
        };
        assert_eq!(event.event_type(), "user_registered");

        let new_event = event.into_new_event();
        assert_eq!(new_event.event_type, "user_registered");
        assert_eq!(new_event.data["type"], "user_registered");
    }

    #[test]
    fn payload_round_trips() {
        let event = DomainEvent::UserLoggedIn {
            user_id: "u-7".into(),
        };
        let new_event = event.into_new_event();

        match DomainEvent::from_event_data(&new_event.data).unwrap() {
            DomainEvent::UserLoggedIn { user_id } => assert_eq!(user_id, "u-7"),
            other => panic!("expected UserLoggedIn, got {other:?}"),
        }
    }
}
