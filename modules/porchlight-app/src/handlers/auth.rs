//! Login, logout, and password digests.

use std::sync::Arc;

use http::{header, HeaderValue};
use sha2::{Digest, Sha256};

use porchlight_web::session::{clear_session_cookie, session_cookie};
use porchlight_web::{HandlerResult, HttpError, RequestContext, Response};

use crate::events::DomainEvent;
use crate::handlers::pages::{escape, page};
use crate::state::AppState;

pub async fn login_form(ctx: Arc<RequestContext>) -> HandlerResult {
    let notice = if ctx.query("registered").is_some() {
        r#"<p class="notice">Account created. Log in to continue.</p>"#
    } else {
        ""
    };

    // Carry the requested destination through the form POST.
    let return_field = match ctx.query("return") {
        Some(target) => format!(
            r#"<input type="hidden" name="return" value="{}">"#,
            escape(&target)
        ),
        None => String::new(),
    };

    Ok(Response::html(page(
        "Log in",
        &format!(
            r#"{notice}<form method="post" action="/login">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  {return_field}
  <button>Log in</button>
</form>"#
        ),
    )))
}

pub async fn login_submit(state: Arc<AppState>, ctx: Arc<RequestContext>) -> HandlerResult {
    let form = ctx.request().form();
    let email = form
        .get("email")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();

    let Some(user) = state.users.find_by_email(&email).await? else {
        return Err(HttpError::unauthorized("invalid email or password"));
    };
    let supplied = password_digest(&email, &password);
    if !constant_time_eq(supplied.as_bytes(), user.password_digest.as_bytes()) {
        return Err(HttpError::unauthorized("invalid email or password"));
    }

    let session = state.sessions.create(&user.id).await?;
    state.sessions.put_flash(&session.id, "Welcome back").await?;
    state
        .events
        .emit(DomainEvent::UserLoggedIn { user_id: user.id }.into_new_event())
        .await?;

    let target = sanitize_return(form.get("return").cloned().or_else(|| ctx.query("return")));
    let cookie =
        HeaderValue::from_str(&session_cookie(&session.id)).map_err(anyhow::Error::from)?;
    Err(HttpError::see_other(target).with_header(header::SET_COOKIE, cookie))
}

pub async fn logout(state: Arc<AppState>, ctx: Arc<RequestContext>) -> HandlerResult {
    if let Some(session) = ctx.session() {
        state.sessions.delete(&session.id).await?;
        state
            .events
            .emit(
                DomainEvent::UserLoggedOut {
                    user_id: session.user_id,
                }
                .into_new_event(),
            )
            .await?;
    }

    let cookie = HeaderValue::from_str(&clear_session_cookie()).map_err(anyhow::Error::from)?;
    Err(HttpError::see_other("/").with_header(header::SET_COOKIE, cookie))
}

/// Salted SHA-256 digest, hex-encoded. The normalized email is the salt,
/// so equal passwords on different accounts digest differently.
pub fn password_digest(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Only same-site absolute paths may be redirect targets after login.
fn sanitize_return(raw: Option<String>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/dashboard".to_string(),
    }
}
