//! Registration: validate, emit the fact, let the listener build the
//! user record.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use porchlight_web::{HandlerResult, HttpError, RequestContext, Response};

use crate::events::DomainEvent;
use crate::handlers::auth::password_digest;
use crate::handlers::pages::page;
use crate::state::AppState;

const REGISTER_FORM: &str = r#"<form method="post" action="/register">
  <label>Email <input type="email" name="email" required></label>
  <label>Name <input type="text" name="name" required></label>
  <label>Password <input type="password" name="password" required></label>
  <label>Confirm password <input type="password" name="confirmation" required></label>
  <button>Create account</button>
</form>"#;

pub async fn form(_ctx: Arc<RequestContext>) -> HandlerResult {
    Ok(Response::html(page("Register", REGISTER_FORM)))
}

pub async fn submit(state: Arc<AppState>, ctx: Arc<RequestContext>) -> HandlerResult {
    let form = ctx.request().form();
    let email = form
        .get("email")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let name = form
        .get("name")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();
    let confirmation = form.get("confirmation").cloned().unwrap_or_default();

    // BTreeMap keeps the rendered field order stable.
    let mut errors = BTreeMap::new();
    if email.is_empty() {
        errors.insert("email", "is required");
    } else if !email.contains('@') {
        errors.insert("email", "is not a valid address");
    }
    if name.is_empty() {
        errors.insert("name", "is required");
    }
    if password.chars().count() < 8 {
        errors.insert("password", "must be at least 8 characters");
    }
    if password != confirmation {
        errors.insert("confirmation", "does not match the password");
    }
    if !errors.is_empty() {
        return Err(HttpError::validation(json!(errors)));
    }

    // The duplicate check happens before any event is emitted.
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(HttpError::conflict(
            "an account with that email already exists",
        ));
    }

    let event = DomainEvent::UserRegistered {
        user_id: Uuid::new_v4().to_string(),
        password_digest: password_digest(&email, &password),
        email,
        name,
    };
    state.events.emit(event.into_new_event()).await?;

    Err(HttpError::see_other("/login?registered=1"))
}
