//! Route table, matching, groups, static mounts, and the dispatch boundary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use http::{Method, StatusCode};
use regex::Regex;

use crate::context;
use crate::error::{HandlerResult, HttpError};
use crate::handler::{Handler, RouteTarget};
use crate::middleware::{run_chain, Middleware};
use crate::request::{Request, RequestContext};
use crate::response::Response;

/// Maps method + path to a handler and drives the middleware chain.
///
/// Routes are scanned in registration order and the first match wins —
/// no best-match heuristics, which makes registration order load-bearing.
pub struct Router {
    routes: Vec<Route>,
    global: Vec<Arc<dyn Middleware>>,
    statics: Vec<StaticMount>,
    dev_mode: bool,
}

struct Route {
    method: Method,
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
    target: RouteTarget,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            global: Vec::new(),
            statics: Vec::new(),
            dev_mode: false,
        }
    }

    /// When on, server faults render their real message and error chain.
    pub fn set_dev_mode(&mut self, enabled: bool) {
        self.dev_mode = enabled;
    }

    /// Append a global middleware. Global middleware observe every
    /// request, matched or not.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.global.push(middleware);
    }

    pub fn get(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::GET, pattern, target, middleware);
    }

    pub fn post(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::POST, pattern, target, middleware);
    }

    pub fn put(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::PUT, pattern, target, middleware);
    }

    pub fn patch(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::PATCH, pattern, target, middleware);
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::DELETE, pattern, target, middleware);
    }

    /// Register a route. The pattern is compiled once, here; an invalid
    /// pattern is a bootstrap error and fails loudly.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        let (regex, param_names) = compile_pattern(pattern)
            .unwrap_or_else(|e| panic!("invalid route pattern {pattern:?}: {e}"));
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            regex,
            param_names,
            target: target.into(),
            middleware,
        });
    }

    /// Register a batch of routes under a shared prefix and middleware.
    ///
    /// `middleware` supplied here runs before anything added through the
    /// group's own `use_middleware`, which in turn runs before per-route
    /// middleware — all after global middleware.
    pub fn group(
        &mut self,
        prefix: &str,
        middleware: Vec<Arc<dyn Middleware>>,
        register: impl FnOnce(&mut RouteGroup),
    ) {
        let mut group = RouteGroup {
            router: self,
            prefix: prefix.to_string(),
            ctor_middleware: middleware,
            added_middleware: Vec::new(),
        };
        register(&mut group);
    }

    /// Serve files under `dir` for GET requests beneath `prefix`, when no
    /// route matched. Consulted ahead of the 404 path.
    pub fn static_files(&mut self, prefix: &str, dir: impl Into<PathBuf>) {
        self.statics.push(StaticMount {
            prefix: prefix.trim_end_matches('/').to_string(),
            dir: dir.into(),
        });
    }

    /// Handle one request, infallibly.
    ///
    /// Establishes the request-scoped context binding, matches and runs
    /// the chain, and converts any raised [`HttpError`] into a response.
    /// No per-request failure propagates past this point.
    pub async fn dispatch(&self, request: Request) -> Response {
        let ctx = RequestContext::new(request);
        context::scope(ctx.clone(), async {
            match self.handle(ctx).await {
                Ok(response) => response,
                Err(err) => err.into_response(self.dev_mode),
            }
        })
        .await
    }

    async fn handle(&self, ctx: Arc<RequestContext>) -> HandlerResult {
        for route in &self.routes {
            if route.method != *ctx.method() {
                continue;
            }
            let Some(captures) = route.regex.captures(ctx.path()) else {
                continue;
            };

            tracing::debug!(
                method = %ctx.method(),
                path = ctx.path(),
                pattern = %route.pattern,
                "route matched"
            );

            let params: HashMap<String, String> = route
                .param_names
                .iter()
                .cloned()
                .zip(
                    captures
                        .iter()
                        .skip(1)
                        .flatten()
                        .map(|m| m.as_str().to_string()),
                )
                .collect();
            ctx.set_params(params);

            // Lazy targets resolve here, per matched request, not at
            // registration time.
            let loaded = route.target.resolve().await?;

            let mut chain = Vec::with_capacity(
                self.global.len() + route.middleware.len() + loaded.middleware.len(),
            );
            chain.extend(self.global.iter().cloned());
            chain.extend(route.middleware.iter().cloned());
            chain.extend(loaded.middleware.iter().cloned());

            return run_chain(&chain, &*loaded.handler, ctx).await;
        }

        // No route matched. Global middleware still observes the request;
        // the terminal handler tries static mounts, then reports 404.
        let fallback = FallbackHandler {
            statics: &self.statics,
        };
        run_chain(&self.global, &fallback, ctx).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefixes and middleware-scopes a batch of route registrations.
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    ctor_middleware: Vec<Arc<dyn Middleware>>,
    added_middleware: Vec<Arc<dyn Middleware>>,
}

impl RouteGroup<'_> {
    /// Append group middleware. Applies to routes registered after this
    /// call, after any constructor-supplied group middleware.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.added_middleware.push(middleware);
    }

    pub fn get(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::GET, pattern, target, middleware);
    }

    pub fn post(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::POST, pattern, target, middleware);
    }

    pub fn put(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::PUT, pattern, target, middleware);
    }

    pub fn patch(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::PATCH, pattern, target, middleware);
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        self.route(Method::DELETE, pattern, target, middleware);
    }

    fn route(
        &mut self,
        method: Method,
        pattern: &str,
        target: impl Into<RouteTarget>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        let full_pattern = format!("{}{}", self.prefix, pattern);
        let mut chain = self.ctor_middleware.clone();
        chain.extend(self.added_middleware.iter().cloned());
        chain.extend(middleware);
        self.router.route(method, &full_pattern, target, chain);
    }
}

/// Compile a path pattern to an anchored regex plus its parameter names.
///
/// Literal segments are escaped; `:name` segments capture any run of
/// non-`/` characters. Trailing slashes are significant — `/posts` and
/// `/posts/` are different patterns.
fn compile_pattern(pattern: &str) -> Result<(Regex, Vec<String>)> {
    let mut source = String::from("^");
    let mut param_names = Vec::new();

    for (i, segment) in pattern.split('/').enumerate() {
        if i > 0 {
            source.push('/');
        }
        if let Some(name) = segment.strip_prefix(':') {
            anyhow::ensure!(!name.is_empty(), "empty parameter name");
            param_names.push(name.to_string());
            source.push_str("([^/]+)");
        } else {
            source.push_str(&regex::escape(segment));
        }
    }
    source.push('$');

    Ok((Regex::new(&source)?, param_names))
}

// ---------------------------------------------------------------------------
// Static file mounts
// ---------------------------------------------------------------------------

struct StaticMount {
    prefix: String,
    dir: PathBuf,
}

impl StaticMount {
    /// Serve the file for `path`, `None` when this mount has nothing for
    /// it. Traversal segments are rejected outright.
    async fn try_serve(&self, path: &str) -> Result<Option<Response>, HttpError> {
        let Some(rest) = path.strip_prefix(self.prefix.as_str()) else {
            return Ok(None);
        };
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            return Ok(None);
        }
        if rest.split('/').any(|segment| segment == "..") {
            return Err(HttpError::forbidden("path traversal is not allowed"));
        }

        let file = self.dir.join(rest);
        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HttpError::Server(e.into())),
        }

        let bytes = tokio::fs::read(&file)
            .await
            .map_err(|e| HttpError::Server(e.into()))?;
        Ok(Some(
            Response::new(StatusCode::OK)
                .with_content_type(content_type_for(&file))
                .with_body(bytes),
        ))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Terminal handler when no route matched: static mounts first, then a
/// 404 naming the method and path.
struct FallbackHandler<'r> {
    statics: &'r [StaticMount],
}

impl Handler for FallbackHandler<'_> {
    fn call(&self, ctx: Arc<RequestContext>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            if *ctx.method() == Method::GET {
                for mount in self.statics {
                    if let Some(response) = mount.try_serve(ctx.path()).await? {
                        return Ok(response);
                    }
                }
            }
            Err(HttpError::not_found(format!(
                "no route for {} {}",
                ctx.method(),
                ctx.path()
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(pattern: &str) -> (Regex, Vec<String>) {
        compile_pattern(pattern).unwrap()
    }

    #[test]
    fn literal_pattern_is_anchored() {
        let (regex, params) = compiled("/posts");
        assert!(params.is_empty());
        assert!(regex.is_match("/posts"));
        assert!(!regex.is_match("/posts/"));
        assert!(!regex.is_match("/posts/42"));
        assert!(!regex.is_match("/api/posts"));
    }

    #[test]
    fn param_segment_captures_without_slashes() {
        let (regex, params) = compiled("/posts/:id");
        assert_eq!(params, ["id"]);

        let caps = regex.captures("/posts/42").unwrap();
        assert_eq!(&caps[1], "42");
        assert!(!regex.is_match("/posts/42/comments"));
        assert!(!regex.is_match("/posts/"));
    }

    #[test]
    fn multiple_params_capture_in_order() {
        let (regex, params) = compiled("/posts/:post_id/comments/:id");
        assert_eq!(params, ["post_id", "id"]);

        let caps = regex.captures("/posts/7/comments/19").unwrap();
        assert_eq!(&caps[1], "7");
        assert_eq!(&caps[2], "19");
    }

    #[test]
    fn literal_segments_are_regex_escaped() {
        let (regex, _) = compiled("/files/app.js");
        assert!(regex.is_match("/files/app.js"));
        assert!(!regex.is_match("/files/appxjs"));
    }

    #[test]
    fn trailing_slash_is_significant() {
        let (regex, _) = compiled("/posts/");
        assert!(regex.is_match("/posts/"));
        assert!(!regex.is_match("/posts"));
    }

    #[test]
    fn empty_param_name_is_rejected() {
        assert!(compile_pattern("/posts/:").is_err());
    }

    #[test]
    fn content_types_map_by_extension() {
        assert_eq!(content_type_for(Path::new("a/style.css")), "text/css");
        assert_eq!(
            content_type_for(Path::new("a/blob.bin")),
            "application/octet-stream"
        );
    }
}
