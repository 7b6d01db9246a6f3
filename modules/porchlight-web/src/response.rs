//! Outbound response: a status + headers + body triple.

use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// A 200 with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_content_type("text/html; charset=utf-8")
            .with_body(body.into())
    }

    /// A 200 with a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).expect("response serialization should never fail");
        Self::ok()
            .with_content_type("application/json")
            .with_body(body)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_content_type(self, content_type: &'static str) -> Self {
        self.with_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
    }

    /// Append a Set-Cookie header. Cookie strings built by this crate are
    /// always valid header values.
    pub fn with_set_cookie(self, cookie: &str) -> Self {
        let value = HeaderValue::from_str(cookie).expect("cookie strings are ASCII");
        self.with_header(header::SET_COOKIE, value)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The body as UTF-8 text, for assertions and adapters.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type() {
        let resp = Response::json(&serde_json::json!({"ok": true}));
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            resp.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(resp.text(), r#"{"ok":true}"#);
    }

    #[test]
    fn set_cookie_headers_accumulate() {
        let resp = Response::ok()
            .with_set_cookie("a=1; Path=/")
            .with_set_cookie("b=2; Path=/");
        let cookies: Vec<_> = resp.headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
    }
}
