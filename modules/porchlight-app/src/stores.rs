//! In-memory collaborator backends: users and sessions.
//!
//! HashMaps behind mutexes — fine for dev and tests. A deployment swaps
//! in durable stores behind the same traits.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use porchlight_web::session::{Session, SessionStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn insert(&self, user: User) -> Result<()>;

    async fn count(&self) -> Result<usize>;
}

#[derive(Default)]
pub struct MemoryUserStore {
    // Keyed by lowercased email.
    users: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&email.to_lowercase())
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<()> {
        self.users
            .lock()
            .unwrap()
            .insert(user.email.to_lowercase(), user);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.lock().unwrap().len())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    flash: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Insert a pre-built session, e.g. one imported from elsewhere.
    pub fn insert_session(&self, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: &str) -> Result<Session> {
        let session = Session::issue(user_id);
        self.insert_session(session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(id) {
            // Lazy deletion on access: an expired session is removed the
            // moment anything asks for it.
            Some(session) if session.is_expired() => {
                sessions.remove(id);
                self.flash.lock().unwrap().remove(id);
                Ok(None)
            }
            Some(session) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.lock().unwrap().remove(id);
        self.flash.lock().unwrap().remove(id);
        Ok(())
    }

    async fn put_flash(&self, session_id: &str, message: &str) -> Result<()> {
        self.flash
            .lock()
            .unwrap()
            .insert(session_id.to_string(), message.to_string());
        Ok(())
    }

    async fn take_flash(&self, session_id: &str) -> Result<Option<String>> {
        Ok(self.flash.lock().unwrap().remove(session_id))
    }
}
