//! Porchlight application: configuration, wiring, handlers, and the
//! listeners that turn domain facts into durable records.

pub mod config;
pub mod events;
pub mod handlers;
pub mod listeners;
pub mod middleware;
pub mod routes;
pub mod serve;
pub mod state;
pub mod stores;
pub mod writer;

pub use config::Config;
pub use state::AppState;
