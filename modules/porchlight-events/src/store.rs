//! EventStore — single gateway for emitting domain facts.
//!
//! Durability precedes visibility: the writer's append must complete before
//! any listener hears about the event. Listener failures are isolated and
//! logged at the fan-out; they never reach the emitting caller.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::types::{Event, NewEvent};

/// Append one event to a durable log.
///
/// `write` must persist before resolving and must not silently drop data.
/// No read API is exposed here — consumers read from whatever the chosen
/// backend makes available.
#[async_trait]
pub trait EventWriter: Send + Sync {
    async fn write(&self, event: &Event) -> Result<()>;
}

/// A subscriber reacting to events of specific types.
///
/// Delivery is at-least-once: `handle` must be safe to invoke more than
/// once for the same event id (check-before-write). The store performs no
/// deduplication on the listener's behalf.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Event types this listener reacts to.
    fn subscribes_to(&self) -> &[&str];

    async fn handle(&self, event: &Event) -> Result<()>;
}

/// Assigns identity and time, delegates persistence to the writer, and
/// fans out to subscribed listeners.
pub struct EventStore {
    writer: Arc<dyn EventWriter>,
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventStore {
    pub fn new(writer: Arc<dyn EventWriter>) -> Self {
        Self {
            writer,
            listeners: Vec::new(),
        }
    }

    /// Register a listener. No de-duplication, no unsubscribe.
    ///
    /// Takes `&mut self`: the listener list is sealed before traffic
    /// begins and treated as read-only during request processing.
    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Persist an event, then notify every matching listener.
    ///
    /// Missing `id`/`timestamp` are assigned here. If the durable write
    /// fails, `emit` fails and no listener is invoked. Listeners for one
    /// emission run concurrently; each failure is logged and swallowed so
    /// one bad listener cannot starve the others or fail the emit.
    ///
    /// The fan-out is awaited to completion before this returns, but a
    /// caller must not assume listener side effects are atomic with the
    /// response that triggered them.
    pub async fn emit(&self, event: NewEvent) -> Result<Event> {
        let event = Event {
            id: event
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(next_event_id),
            timestamp: event
                .timestamp
                .filter(|ts| *ts > 0)
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
            event_type: event.event_type,
            data: event.data,
        };

        // Durability precedes visibility.
        self.writer.write(&event).await?;

        let interested = self
            .listeners
            .iter()
            .filter(|l| l.subscribes_to().contains(&event.event_type.as_str()));

        futures::future::join_all(interested.map(|listener| {
            let event = &event;
            async move {
                if let Err(e) = listener.handle(event).await {
                    warn!(
                        error = %e,
                        event_id = %event.id,
                        event_type = %event.event_type,
                        "event listener failed"
                    );
                }
            }
        }))
        .await;

        Ok(event)
    }
}

/// Wall-clock millis plus a short random suffix. Best-effort uniqueness
/// under concurrency and clock skew, not a guaranteed-unique key.
fn next_event_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let entropy = uuid::Uuid::new_v4().simple().to_string();
    format!("evt_{millis}_{}", &entropy[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_carry_prefix_and_suffix() {
        let id = next_event_id();
        assert!(id.starts_with("evt_"));

        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 6);
    }
}
