//! Integration tests for EventStore emit/fan-out behavior.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use porchlight_events::{Event, EventListener, EventStore, EventWriter, NewEvent};

/// Shared journal recording the order of writer and listener activity.
type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct MemoryWriter {
    events: Mutex<Vec<Event>>,
    journal: Journal,
}

#[async_trait]
impl EventWriter for MemoryWriter {
    async fn write(&self, event: &Event) -> Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("write:{}", event.event_type));
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct FailingWriter;

#[async_trait]
impl EventWriter for FailingWriter {
    async fn write(&self, _event: &Event) -> Result<()> {
        anyhow::bail!("disk full")
    }
}

struct Recorder {
    types: Vec<&'static str>,
    seen: Mutex<Vec<Event>>,
    journal: Journal,
    fail: bool,
}

impl Recorder {
    fn new(types: Vec<&'static str>) -> Self {
        Self {
            types,
            seen: Mutex::new(Vec::new()),
            journal: Journal::default(),
            fail: false,
        }
    }

    fn failing(types: Vec<&'static str>) -> Self {
        Self {
            fail: true,
            ..Self::new(types)
        }
    }

    fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    fn seen_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl EventListener for Recorder {
    fn subscribes_to(&self) -> &[&str] {
        &self.types
    }

    async fn handle(&self, event: &Event) -> Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("handle:{}", event.event_type));
        self.seen.lock().unwrap().push(event.clone());
        if self.fail {
            anyhow::bail!("listener exploded");
        }
        Ok(())
    }
}

// =========================================================================
// Identity assignment
// =========================================================================

#[tokio::test]
async fn emit_assigns_id_and_timestamp_when_blank() {
    let writer = Arc::new(MemoryWriter::default());
    let store = EventStore::new(writer.clone());

    let event = store
        .emit(NewEvent::new("user_registered", json!({"email": "a@b.c"})))
        .await
        .unwrap();

    assert!(event.id.starts_with("evt_"));
    assert!(event.timestamp > 0);

    // The persisted copy carries the same assigned identity.
    let written = writer.events.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].id, event.id);
    assert_eq!(written[0].timestamp, event.timestamp);
}

#[tokio::test]
async fn explicit_id_and_timestamp_are_preserved() {
    let writer = Arc::new(MemoryWriter::default());
    let store = EventStore::new(writer.clone());

    let event = store
        .emit(
            NewEvent::new("imported", json!({}))
                .with_id("evt_legacy_import")
                .with_timestamp(1_500_000_000_000),
        )
        .await
        .unwrap();

    assert_eq!(event.id, "evt_legacy_import");
    assert_eq!(event.timestamp, 1_500_000_000_000);
}

#[tokio::test]
async fn empty_string_id_is_treated_as_blank() {
    let writer = Arc::new(MemoryWriter::default());
    let store = EventStore::new(writer);

    let event = store
        .emit(NewEvent::new("x", json!({})).with_id(""))
        .await
        .unwrap();

    assert!(event.id.starts_with("evt_"));
}

// =========================================================================
// Fan-out behavior
// =========================================================================

#[tokio::test]
async fn subscribed_listener_invoked_exactly_once_per_emit() {
    let listener = Arc::new(Recorder::new(vec!["user_registered"]));
    let mut store = EventStore::new(Arc::new(MemoryWriter::default()));
    store.subscribe(listener.clone());

    store
        .emit(NewEvent::new("user_registered", json!({"email": "a@b.c"})))
        .await
        .unwrap();

    assert_eq!(listener.seen_count(), 1);

    store
        .emit(NewEvent::new("user_registered", json!({"email": "d@e.f"})))
        .await
        .unwrap();

    assert_eq!(listener.seen_count(), 2);
}

#[tokio::test]
async fn unsubscribed_listener_is_never_invoked() {
    let registered = Arc::new(Recorder::new(vec!["user_registered"]));
    let logins = Arc::new(Recorder::new(vec!["user_logged_in"]));
    let mut store = EventStore::new(Arc::new(MemoryWriter::default()));
    store.subscribe(registered.clone());
    store.subscribe(logins.clone());

    store
        .emit(NewEvent::new("user_registered", json!({})))
        .await
        .unwrap();

    assert_eq!(registered.seen_count(), 1);
    assert_eq!(logins.seen_count(), 0);
}

#[tokio::test]
async fn multiple_listeners_on_same_type_all_notified() {
    let a = Arc::new(Recorder::new(vec!["user_registered"]));
    let b = Arc::new(Recorder::new(vec!["user_registered", "user_logged_in"]));
    let mut store = EventStore::new(Arc::new(MemoryWriter::default()));
    store.subscribe(a.clone());
    store.subscribe(b.clone());

    store
        .emit(NewEvent::new("user_registered", json!({})))
        .await
        .unwrap();

    assert_eq!(a.seen_count(), 1);
    assert_eq!(b.seen_count(), 1);
}

#[tokio::test]
async fn one_failing_listener_does_not_block_the_others() {
    let bad = Arc::new(Recorder::failing(vec!["user_registered"]));
    let good = Arc::new(Recorder::new(vec!["user_registered"]));
    let writer = Arc::new(MemoryWriter::default());
    let mut store = EventStore::new(writer.clone());
    store.subscribe(bad.clone());
    store.subscribe(good.clone());

    // The emit itself must still succeed.
    store
        .emit(NewEvent::new("user_registered", json!({})))
        .await
        .unwrap();

    assert_eq!(bad.seen_count(), 1);
    assert_eq!(good.seen_count(), 1);
    assert_eq!(writer.events.lock().unwrap().len(), 1);
}

// =========================================================================
// Durability precedes visibility
// =========================================================================

#[tokio::test]
async fn writer_failure_fails_emit_and_skips_listeners() {
    let listener = Arc::new(Recorder::new(vec!["user_registered"]));
    let mut store = EventStore::new(Arc::new(FailingWriter));
    store.subscribe(listener.clone());

    let result = store.emit(NewEvent::new("user_registered", json!({}))).await;

    assert!(result.is_err());
    assert_eq!(listener.seen_count(), 0);
}

#[tokio::test]
async fn write_completes_before_any_listener_runs() {
    let journal = Journal::default();
    let writer = Arc::new(MemoryWriter {
        events: Mutex::new(Vec::new()),
        journal: journal.clone(),
    });
    let listener = Arc::new(Recorder::new(vec!["ordered"]).with_journal(journal.clone()));
    let mut store = EventStore::new(writer);
    store.subscribe(listener);

    store.emit(NewEvent::new("ordered", json!({}))).await.unwrap();

    let entries = journal.lock().unwrap();
    assert_eq!(entries.as_slice(), ["write:ordered", "handle:ordered"]);
}
