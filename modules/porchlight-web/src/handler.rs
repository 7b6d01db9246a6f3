//! Route handlers: direct functions or lazily resolved modules.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::error::{HandlerResult, HttpError};
use crate::middleware::Middleware;
use crate::request::RequestContext;

/// The terminal step of a middleware chain.
///
/// Implemented for any `async fn(Arc<RequestContext>) -> HandlerResult`
/// and for hand-written handler types.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: Arc<RequestContext>) -> BoxFuture<'_, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Arc<RequestContext>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Arc<RequestContext>) -> BoxFuture<'_, HandlerResult> {
        Box::pin((self)(ctx))
    }
}

/// What a lazy loader resolves to: the handler, plus any middleware the
/// module carries with it (merged handler-adjacent).
#[derive(Clone)]
pub struct LoadedRoute {
    pub handler: Arc<dyn Handler>,
    pub middleware: Vec<Arc<dyn Middleware>>,
}

impl LoadedRoute {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            middleware: Vec::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }
}

/// Produces a route's handler on demand, at request-match time.
///
/// Implemented for any `async fn() -> anyhow::Result<LoadedRoute>`.
/// A loader that fails is a configuration error, surfaced as a server
/// fault on the request that tripped it.
pub trait HandlerLoader: Send + Sync {
    fn load(&self) -> BoxFuture<'static, anyhow::Result<LoadedRoute>>;
}

impl<F, Fut> HandlerLoader for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<LoadedRoute>> + Send + 'static,
{
    fn load(&self) -> BoxFuture<'static, anyhow::Result<LoadedRoute>> {
        Box::pin((self)())
    }
}

/// A route's handler slot: resolved up front, or deferred to first match.
pub enum RouteTarget {
    Direct(Arc<dyn Handler>),
    Lazy {
        loader: Arc<dyn HandlerLoader>,
        cache: OnceCell<LoadedRoute>,
    },
}

impl RouteTarget {
    pub fn direct(handler: impl Handler + 'static) -> Self {
        Self::Direct(Arc::new(handler))
    }

    pub fn lazy(loader: impl HandlerLoader + 'static) -> Self {
        Self::Lazy {
            loader: Arc::new(loader),
            cache: OnceCell::new(),
        }
    }

    /// Resolve to a concrete handler. Lazy targets load once and cache;
    /// repeated matches reuse the resolved module.
    pub(crate) async fn resolve(&self) -> Result<LoadedRoute, HttpError> {
        match self {
            Self::Direct(handler) => Ok(LoadedRoute {
                handler: handler.clone(),
                middleware: Vec::new(),
            }),
            Self::Lazy { loader, cache } => {
                let loaded = cache
                    .get_or_try_init(|| loader.load())
                    .await
                    .map_err(|e| {
                        HttpError::Server(e.context("lazy route handler failed to resolve"))
                    })?;
                Ok(loaded.clone())
            }
        }
    }
}

impl<H: Handler + 'static> From<H> for RouteTarget {
    fn from(handler: H) -> Self {
        Self::direct(handler)
    }
}
