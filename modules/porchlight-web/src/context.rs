//! Ambient request-scoped context.
//!
//! The router binds the [`RequestContext`] once per request at the top of
//! its handling path; everything that runs during that request — however
//! many async hops down — can reach it through [`current`] without
//! parameter threading. The binding is task-scoped, so concurrent
//! requests never observe each other's context.

use std::future::Future;
use std::sync::Arc;

use crate::request::RequestContext;

tokio::task_local! {
    static CURRENT_REQUEST: Arc<RequestContext>;
}

/// Run `fut` with `ctx` bound as the current request.
pub(crate) async fn scope<F: Future>(ctx: Arc<RequestContext>, fut: F) -> F::Output {
    CURRENT_REQUEST.scope(ctx, fut).await
}

/// The context of the request currently being handled.
///
/// Panics when called outside an active request. That is a programmer
/// error — there is deliberately no silent default.
pub fn current() -> Arc<RequestContext> {
    try_current()
        .unwrap_or_else(|| panic!("context::current() called outside an active request scope"))
}

/// Like [`current`], but `None` outside a request.
pub fn try_current() -> Option<Arc<RequestContext>> {
    CURRENT_REQUEST.try_with(Arc::clone).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use http::Method;

    #[tokio::test]
    async fn binding_is_visible_only_inside_the_scope() {
        assert!(try_current().is_none());

        let ctx = RequestContext::new(Request::new(Method::GET, "/posts/7"));
        scope(ctx, async {
            assert_eq!(current().path(), "/posts/7");

            // Still bound after an await point.
            tokio::task::yield_now().await;
            assert!(try_current().is_some());
        })
        .await;

        assert!(try_current().is_none());
    }

    #[tokio::test]
    #[should_panic(expected = "outside an active request")]
    async fn current_outside_a_request_panics() {
        let _ = current();
    }
}
