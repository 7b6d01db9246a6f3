//! Server-rendered pages. Presentation stays minimal on purpose.

use std::sync::Arc;

use porchlight_web::{HandlerResult, HttpError, RequestContext, Response};

use crate::state::AppState;

pub async fn home(ctx: Arc<RequestContext>) -> HandlerResult {
    let nav = match ctx.session() {
        Some(_) => r#"<a href="/dashboard">Dashboard</a>"#,
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#,
    };
    Ok(Response::html(page(
        "Porchlight",
        &format!("<p>A light left on for the neighborhood.</p><nav>{nav}</nav>"),
    )))
}

pub async fn dashboard(state: Arc<AppState>, ctx: Arc<RequestContext>) -> HandlerResult {
    let session = ctx
        .session()
        .ok_or_else(|| HttpError::unauthorized("login required"))?;

    // One-time notice, cleared by this read.
    let flash = state.sessions.take_flash(&session.id).await?;
    let notice = flash
        .map(|message| format!(r#"<p class="flash">{}</p>"#, escape(&message)))
        .unwrap_or_default();

    Ok(Response::html(page(
        "Dashboard",
        &format!(
            r#"{notice}<p>Signed in as {}.</p>
<form method="post" action="/logout"><button>Log out</button></form>"#,
            escape(&session.user_id)
        ),
    )))
}

/// Shared page shell.
pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>{title}</h1>
  {body}
</body>
</html>"#
    )
}

/// Escape text for HTML body and attribute positions.
pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>"&"</script>"#),
            "&lt;script&gt;&quot;&amp;&quot;&lt;/script&gt;"
        );
    }
}
