//! Sessions, the session-store contract, and the cookie codec.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";
const SESSION_DURATION_SECS: i64 = 7 * 24 * 3600; // 7 days

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Mint a fresh session for a user, expiring in 7 days.
    pub fn issue(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("sess_{}", Uuid::new_v4().simple()),
            user_id: user_id.into(),
            created_at: now,
            expires_at: now + Duration::seconds(SESSION_DURATION_SECS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Server-side session persistence, implemented by collaborators.
///
/// Expiry is enforced at read time: `get` deletes and withholds sessions
/// past their `expires_at` (lazy deletion on access).
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: &str) -> Result<Session>;

    async fn get(&self, id: &str) -> Result<Option<Session>>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Store a one-time message against a session.
    async fn put_flash(&self, session_id: &str, message: &str) -> Result<()>;

    /// Retrieve the flash message, clearing it. Subsequent calls return
    /// `None` until a new one is put.
    async fn take_flash(&self, session_id: &str) -> Result<Option<String>>;
}

/// Build the Set-Cookie header value carrying a session id.
pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_DURATION_SECS}"
    )
}

/// Build a Set-Cookie header that clears the session.
pub fn clear_session_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Parse a specific cookie from the Cookie header string.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value);
            }
        }
    }
    None
}
