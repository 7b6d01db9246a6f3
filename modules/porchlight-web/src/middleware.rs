//! Pull-based middleware chain.
//!
//! Each middleware receives the request context and a [`Next`]; calling
//! `next.run(ctx)` invokes the rest of the chain (ending in the route
//! handler). Not calling it short-circuits with the middleware's own
//! result, synchronously or after any number of awaits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerResult;
use crate::handler::Handler;
use crate::request::RequestContext;

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: Arc<RequestContext>, next: Next<'_>) -> HandlerResult;
}

/// The remainder of a chain plus its terminal handler.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self {
            remaining: chain,
            handler,
        }
    }

    /// Run the next middleware, or the handler if none remain.
    pub async fn run(self, ctx: Arc<RequestContext>) -> HandlerResult {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                let next = Next {
                    remaining: rest,
                    handler: self.handler,
                };
                middleware.handle(ctx, next).await
            }
            None => self.handler.call(ctx).await,
        }
    }
}

/// Execute `chain` outer-to-inner, terminating in `handler`.
pub(crate) async fn run_chain(
    chain: &[Arc<dyn Middleware>],
    handler: &dyn Handler,
    ctx: Arc<RequestContext>,
) -> HandlerResult {
    Next::new(chain, handler).run(ctx).await
}
