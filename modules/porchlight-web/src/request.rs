//! Inbound request and the per-request mutable context.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use http::header::AsHeaderName;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method};

use crate::session::Session;

/// A plain inbound HTTP request: method, path, query, headers, body.
///
/// Runtime adapters build this from whatever their socket layer produces.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request from a method and a target like `/posts/42?page=2`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (target.to_string(), String::new()),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// A header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as an `application/x-www-form-urlencoded` form.
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body)
            .into_owned()
            .collect()
    }

    /// Path plus query string, as originally requested.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Per-request state threaded through the middleware chain.
///
/// Created fresh for each inbound request, exclusively owned by that
/// request's task tree, and discarded once the response is produced.
/// Middleware mutate it (params, session, extensions) through short
/// interior-mutability sections; downstream consumers read it, possibly
/// via [`crate::context::current`].
pub struct RequestContext {
    request: Request,
    query: HashMap<String, String>,
    params: Mutex<HashMap<String, String>>,
    session: Mutex<Option<Session>>,
    extensions: Mutex<Extensions>,
}

impl RequestContext {
    pub fn new(request: Request) -> Arc<Self> {
        let query = url::form_urlencoded::parse(request.query.as_bytes())
            .into_owned()
            .collect();
        Arc::new(Self {
            request,
            query,
            params: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            extensions: Mutex::new(Extensions::new()),
        })
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// A decoded query parameter.
    pub fn query(&self, key: &str) -> Option<String> {
        self.query.get(key).cloned()
    }

    /// A captured path parameter (`:name` segment).
    pub fn param(&self, key: &str) -> Option<String> {
        self.params.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn set_params(&self, params: HashMap<String, String>) {
        *self.params.lock().unwrap() = params;
    }

    /// The session attached by middleware, if any.
    pub fn session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap() = session;
    }

    /// Attach a typed extension value for downstream middleware/handlers.
    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&self, value: T) {
        self.extensions.lock().unwrap().insert(value);
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.extensions.lock().unwrap().get::<T>().cloned()
    }
}
