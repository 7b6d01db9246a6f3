//! Error taxonomy and the error-to-response boundary.
//!
//! Handlers and middleware signal redirects and client faults by raising
//! an [`HttpError`]; the router's dispatch boundary converts every one of
//! them into a response. Nothing deeper in the stack inspects variants.

use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::response::Response;

/// What every handler and middleware returns.
pub type HandlerResult = Result<Response, HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Not truly an error: a control-flow shortcut meaning "stop, respond
    /// with a 3xx and a Location header, no body".
    #[error("redirect to {location}")]
    Redirect {
        status: StatusCode,
        location: String,
        headers: HeaderMap,
    },

    /// A 400-class fault attributable to the request.
    #[error("{message}")]
    Client {
        status: StatusCode,
        code: &'static str,
        message: String,
        details: Option<serde_json::Value>,
        headers: HeaderMap,
    },

    /// Anything uncategorized. Mapped to a 500; the real message is only
    /// rendered when dev mode is on.
    #[error(transparent)]
    Server(#[from] anyhow::Error),
}

impl HttpError {
    /// A 302 to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            status: StatusCode::FOUND,
            location: location.into(),
            headers: HeaderMap::new(),
        }
    }

    /// A 303 to `location` — the right shape after a form POST.
    pub fn see_other(location: impl Into<String>) -> Self {
        Self::Redirect {
            status: StatusCode::SEE_OTHER,
            location: location.into(),
            headers: HeaderMap::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::client(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::client(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::client(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::client(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::client(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// A validation failure carrying per-field messages.
    pub fn validation(details: serde_json::Value) -> Self {
        Self::Client {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "VALIDATION",
            message: "validation failed".to_string(),
            details: Some(details),
            headers: HeaderMap::new(),
        }
    }

    pub fn rate_limited(retry_after_secs: Option<u64>) -> Self {
        let mut headers = HeaderMap::new();
        if let Some(secs) = retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                headers.insert(header::RETRY_AFTER, value);
            }
        }
        Self::Client {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: "RATE_LIMITED",
            message: "too many requests".to_string(),
            details: None,
            headers,
        }
    }

    fn client(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            code,
            message: message.into(),
            details: None,
            headers: HeaderMap::new(),
        }
    }

    /// Attach an extra response header (e.g. a Set-Cookie on a redirect).
    /// No effect on server faults.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        match &mut self {
            Self::Redirect { headers, .. } | Self::Client { headers, .. } => {
                headers.append(name, value);
            }
            Self::Server(_) => {}
        }
        self
    }

    /// The machine-readable code, where one applies.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Redirect { .. } => None,
            Self::Client { code, .. } => Some(code),
            Self::Server(_) => Some("INTERNAL"),
        }
    }

    /// Convert into the response the boundary sends. Redirects keep their
    /// extra headers and an empty body; client faults render a structured
    /// JSON error; server faults render a generic message unless dev mode
    /// is on.
    pub fn into_response(self, dev_mode: bool) -> Response {
        match self {
            Self::Redirect {
                status,
                location,
                headers,
            } => {
                let mut resp = Response::new(status);
                resp.headers = headers;
                if let Ok(value) = HeaderValue::from_str(&location) {
                    resp.headers.insert(header::LOCATION, value);
                }
                resp
            }
            Self::Client {
                status,
                code,
                message,
                details,
                headers,
            } => {
                let mut error = json!({"message": message, "code": code});
                if let Some(details) = details {
                    error["details"] = details;
                }
                let mut resp = Response::json(&json!({ "error": error })).with_status(status);
                for (name, value) in headers.iter() {
                    resp.headers.append(name.clone(), value.clone());
                }
                resp
            }
            Self::Server(err) => {
                let error = if dev_mode {
                    json!({
                        "message": err.to_string(),
                        "code": "INTERNAL",
                        "detail": format!("{err:?}"),
                    })
                } else {
                    json!({"message": "internal server error", "code": "INTERNAL"})
                };
                Response::json(&json!({ "error": error }))
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_preserves_extra_headers() {
        let resp = HttpError::see_other("/login")
            .with_header(
                header::SET_COOKIE,
                HeaderValue::from_static("session=abc; Path=/"),
            )
            .into_response(false);

        assert_eq!(resp.status, StatusCode::SEE_OTHER);
        assert_eq!(resp.headers.get(header::LOCATION).unwrap(), "/login");
        assert_eq!(
            resp.headers.get(header::SET_COOKIE).unwrap(),
            "session=abc; Path=/"
        );
        assert!(resp.body.is_empty());
    }

    #[test]
    fn client_fault_renders_structured_body() {
        let resp = HttpError::validation(json!({"email": "is required"})).into_response(false);
        assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION");
        assert_eq!(body["error"]["details"]["email"], "is required");
    }

    #[test]
    fn server_fault_is_generic_outside_dev_mode() {
        let err = HttpError::Server(anyhow::anyhow!("db password was hunter2"));

        let prod = err.into_response(false);
        assert_eq!(prod.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!prod.text().contains("hunter2"));

        let err = HttpError::Server(anyhow::anyhow!("db password was hunter2"));
        let dev = err.into_response(true);
        assert!(dev.text().contains("hunter2"));
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let resp = HttpError::rate_limited(Some(30)).into_response(false);
        assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers.get(header::RETRY_AFTER).unwrap(), "30");
    }
}
