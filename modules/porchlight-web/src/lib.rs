//! Minimal HTTP routing and middleware pipeline.
//!
//! A [`Router`] maps method + path to a handler, builds a fresh
//! [`RequestContext`] per request, and drives an ordered middleware chain
//! with a single error boundary: every failure a handler or middleware
//! raises becomes a well-formed [`Response`] inside [`Router::dispatch`],
//! never a crashed request.
//!
//! The crate is runtime-agnostic: requests come in as plain
//! [`Request`] values and leave as status + headers + body. Whatever
//! serves sockets adapts at the edge.

pub mod context;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod session;

pub use error::{HandlerResult, HttpError};
pub use handler::{Handler, HandlerLoader, LoadedRoute, RouteTarget};
pub use middleware::{Middleware, Next};
pub use request::{Request, RequestContext};
pub use response::Response;
pub use router::{RouteGroup, Router};
pub use session::{Session, SessionStore};
