//! Generic, domain-agnostic append-only event store.
//!
//! Facts go in through [`EventStore::emit`]; a pluggable [`EventWriter`]
//! makes them durable; subscribed [`EventListener`]s are notified once the
//! write has landed. The writer contract is deliberately write-only —
//! reading the log back is each consumer's own concern, against whatever
//! backend it pairs with.

pub mod store;
pub mod types;

pub use store::{EventListener, EventStore, EventWriter};
pub use types::{Event, NewEvent};
