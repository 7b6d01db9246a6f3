//! Process-lifetime wiring: stores, event store, listeners.

use std::sync::Arc;

use porchlight_events::{EventStore, EventWriter};
use porchlight_web::SessionStore;

use crate::listeners::RegistrationListener;
use crate::stores::UserStore;

/// Everything request handling needs, built once at startup and read-only
/// afterwards. Passed explicitly to handlers — no ambient globals.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub events: EventStore,
}

impl AppState {
    /// Wire the event store and subscribe all listeners. Subscriptions
    /// happen here, before any traffic, and never after.
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        writer: Arc<dyn EventWriter>,
    ) -> Arc<Self> {
        let mut events = EventStore::new(writer);
        events.subscribe(Arc::new(RegistrationListener::new(users.clone())));

        Arc::new(Self {
            users,
            sessions,
            events,
        })
    }
}
