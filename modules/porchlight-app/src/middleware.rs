//! Application middleware: request logging, session loading, auth guard.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use http::header;
use tracing::info;
use url::form_urlencoded;

use porchlight_web::middleware::Next;
use porchlight_web::session::{parse_cookie, COOKIE_NAME};
use porchlight_web::{HandlerResult, HttpError, Middleware, RequestContext, SessionStore};

/// Logs method, path, outcome, and elapsed time for every request.
pub struct RequestLog;

#[async_trait]
impl Middleware for RequestLog {
    async fn handle(&self, ctx: Arc<RequestContext>, next: Next<'_>) -> HandlerResult {
        let started = Instant::now();
        let method = ctx.method().clone();
        let path = ctx.path().to_string();

        let result = next.run(ctx).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                info!(%method, %path, status = response.status.as_u16(), elapsed_ms, "request")
            }
            Err(err) => {
                info!(%method, %path, outcome = err.code().unwrap_or("redirect"), elapsed_ms, "request")
            }
        }
        result
    }
}

/// Resolves the session cookie into a context-attached session.
///
/// Runs globally, so every downstream middleware and handler sees
/// `ctx.session()` already populated (or absent).
pub struct SessionLoader {
    sessions: Arc<dyn SessionStore>,
}

impl SessionLoader {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Middleware for SessionLoader {
    async fn handle(&self, ctx: Arc<RequestContext>, next: Next<'_>) -> HandlerResult {
        if let Some(cookie_header) = ctx.request().header(header::COOKIE) {
            if let Some(id) = parse_cookie(cookie_header, COOKIE_NAME) {
                if let Some(session) = self.sessions.get(id).await? {
                    ctx.set_session(Some(session));
                }
            }
        }
        next.run(ctx).await
    }
}

/// Redirects anonymous requests to the login page, carrying the original
/// target in a `return` query parameter.
#[derive(Default)]
pub struct RequireAuth;

impl RequireAuth {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for RequireAuth {
    async fn handle(&self, ctx: Arc<RequestContext>, next: Next<'_>) -> HandlerResult {
        if ctx.session().is_none() {
            let return_to: String =
                form_urlencoded::byte_serialize(ctx.request().target().as_bytes()).collect();
            return Err(HttpError::redirect(format!("/login?return={return_to}")));
        }
        next.run(ctx).await
    }
}
