//! Event writer backends.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use porchlight_events::{Event, EventWriter};

/// Append-only JSON-lines log on the local filesystem.
///
/// Each write opens the file, appends one line, and syncs before
/// resolving. Writers in separate processes can interleave lines — a
/// known limitation of the file backend, not solved here.
pub struct JsonlEventWriter {
    path: PathBuf,
}

impl JsonlEventWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventWriter for JsonlEventWriter {
    async fn write(&self, event: &Event) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening event log {}", self.path.display()))?;
        file.write_all(&line).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}

/// Events kept in memory. Used by tests and by dev runs with no
/// `EVENTS_PATH` configured.
#[derive(Default)]
pub struct MemoryEventWriter {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventWriter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventWriter for MemoryEventWriter {
    async fn write(&self, event: &Event) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn jsonl_writer_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let writer = JsonlEventWriter::new(&path);

        for i in 0..3 {
            let event = Event {
                id: format!("evt_test_{i}"),
                timestamp: 1_700_000_000_000 + i,
                event_type: "user_registered".into(),
                data: json!({"i": i}),
            };
            writer.write(&event).await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: Event = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.id, "evt_test_0");
        assert_eq!(first.event_type, "user_registered");
    }
}
