//! axum adapter — the only place real sockets meet the framework.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use porchlight_web::{Request, Router};

/// Bodies past this size are refused before dispatch.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub async fn serve(router: Router, addr: SocketAddr) -> Result<()> {
    let app = axum::Router::new()
        .fallback(handle)
        .with_state(Arc::new(router));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle(
    State(router): State<Arc<Router>>,
    req: axum::http::Request<Body>,
) -> axum::response::Response {
    let (parts, body) = req.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let mut out = axum::response::Response::new(Body::from("request body too large"));
            *out.status_mut() = StatusCode::PAYLOAD_TOO_LARGE;
            return out;
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let mut request = Request::new(parts.method, target);
    request.headers = parts.headers;
    request.body = bytes.to_vec();

    let response = router.dispatch(request).await;

    let mut out = axum::response::Response::new(Body::from(response.body));
    *out.status_mut() = response.status;
    *out.headers_mut() = response.headers;
    out
}
