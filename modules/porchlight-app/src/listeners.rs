//! Event listeners — where domain facts become durable records.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use porchlight_events::{Event, EventListener};

use crate::events::DomainEvent;
use crate::stores::{User, UserStore};

/// Creates the user record when a registration fact lands.
///
/// Delivery is at-least-once, so this checks before writing: a second
/// delivery of the same registration is a no-op.
pub struct RegistrationListener {
    users: Arc<dyn UserStore>,
}

impl RegistrationListener {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl EventListener for RegistrationListener {
    fn subscribes_to(&self) -> &[&str] {
        &["user_registered"]
    }

    async fn handle(&self, event: &Event) -> Result<()> {
        let payload = DomainEvent::from_event_data(&event.data)?;
        let DomainEvent::UserRegistered {
            user_id,
            email,
            name,
            password_digest,
        } = payload
        else {
            anyhow::bail!("unexpected payload for {}", event.event_type);
        };

        if self.users.find_by_email(&email).await?.is_some() {
            debug!(%email, event_id = %event.id, "user already exists, skipping");
            return Ok(());
        }

        self.users
            .insert(User {
                id: user_id,
                email: email.clone(),
                name,
                password_digest,
                created_at: Utc::now(),
            })
            .await?;

        info!(%email, event_id = %event.id, "user record created");
        Ok(())
    }
}
